//! Extractor system for the Cirrus framework.
//!
//! This module provides the [`FromContext`] trait and built-in implementations
//! that enable Cirrus's parameter injection system. Handler functions declare
//! what they need, and the framework provides it from the [`HandlerContext`].
//!
//! # Core Concept
//!
//! ```rust,ignore
//! pub trait FromContext: Sized {
//!     fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self>;
//! }
//! ```
//!
//! Decorators inject named values into the context; extractors such as
//! [`Domain`] or [`Body`] read them back with a concrete type:
//!
//! ```rust,ignore
//! let svc = ServiceBuilder::new()
//!     .layer(http_response())
//!     .layer(domain_aware())
//!     .layer(body(["name"], []))
//!     .handler(|domain: Domain, Body(item): Body<NewItem>| async move {
//!         Json(create(&domain, item))
//!     });
//! ```
//!
//! # Error Handling
//!
//! If an extractor fails, the handler is not called and the pipeline fails
//! with [`ExtractError`](cirrus_core::ExtractError). Optional extractors with
//! [`Option<T>`] never fail.
//!
//! [`HandlerContext`]: crate::HandlerContext

pub mod core;
pub mod injected;

pub use self::core::FromContext;
pub use injected::{
    Body, Configuration, Domain, Extras, Message, Namespace, RequestOrigin, Subject, TopicArn,
};
