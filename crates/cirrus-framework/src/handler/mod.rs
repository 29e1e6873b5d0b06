//! Handler and service system for the Cirrus framework.
//!
//! - **Handler** ([`traits`]) – The core [`Handler`] trait that adapts functions
//!   with parameter injection, similar to Axum's system
//! - **Service** ([`service`]) – The [`HandlerService`] wrapper that turns a
//!   handler into a `tower::Service`
//! - **Builder** ([`builder`]) – [`ServiceBuilderExt::handler`] to close a
//!   decorator chain
//!
//! # Architecture
//!
//! Decorators are tower layers stacked on top of the handler service with
//! [`ServiceBuilder`](tower::ServiceBuilder). The first layer added is the
//! outermost one:
//!
//! ```text
//! ServiceBuilder::new()
//!     .layer(http_response())      ← outermost: normalizes the outcome
//!     .layer(allow_origin_response(..)?)
//!     .layer(body(["a"], []))
//!     .handler(my_handler)         ← HandlerService, innermost
//! ```

pub mod builder;
pub mod service;
pub mod traits;

pub use builder::ServiceBuilderExt;
pub use service::HandlerService;
pub use traits::Handler;

pub use tower::Layer;
