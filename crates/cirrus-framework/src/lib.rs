//! # Cirrus Framework
//!
//! The decorator pipeline for serverless handlers.
//!
//! This layer provides:
//! - [`HandlerContext`], the per-invocation context shared by every layer
//! - the [`Decorator`] abstraction and the built-in decorator library ([`layers`])
//! - the Axum-style [`Handler`] trait with typed extractors ([`extractor`])
//! - the response normalizer ([`http_response`])
//!
//! A pipeline is a tower service built with [`ServiceBuilder`](tower::ServiceBuilder):
//!
//! ```rust,ignore
//! use cirrus_framework::prelude::*;
//!
//! let svc = ServiceBuilder::new()
//!     .layer(http_response())
//!     .layer(allow_origin_response(r".*\.example\.com")?)
//!     .layer(domain_aware())
//!     .layer(body(&["name"], &[]))
//!     .handler(|domain: Domain, Body(item): Body<Value>| async move {
//!         json!({ "domain": domain.as_str(), "item": item })
//!     });
//! ```

pub mod context;
pub mod decorator;
pub mod extractor;
pub mod handler;
pub mod layers;
pub mod response;

pub use context::{HandlerContext, keys};
pub use decorator::{Decorator, DecoratorLayer, DecoratorService};
pub use extractor::{
    Body, Configuration, Domain, Extras, FromContext, Message, Namespace, RequestOrigin, Subject,
    TopicArn,
};
pub use handler::{Handler, HandlerService, ServiceBuilderExt};
pub use layers::{
    ConfigurationAccessor, SubscriberError, allow_origin_response, body, catch_errors,
    configuration_aware, domain_aware, environ_aware, namespace_aware, parameters, scopes,
    sub_aware, subscriber,
};
pub use response::{
    HandlerPanicked, HttpResponseLayer, HttpResponseService, catch_panic, default_error_message,
    http_response, normalize, normalize_error,
};

/// Prelude for building pipelines.
pub mod prelude {
    pub use super::extractor::{
        Body, Configuration, Domain, Extras, FromContext, Message, Namespace, RequestOrigin,
        Subject, TopicArn,
    };
    pub use super::handler::ServiceBuilderExt;
    pub use super::layers::*;
    pub use super::response::{HttpResponseLayer, http_response};
    pub use super::{Decorator, DecoratorLayer, HandlerContext};
    pub use tower::{Layer, ServiceBuilder, ServiceExt};
}
