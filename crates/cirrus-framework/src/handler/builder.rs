//! Extension trait for tower service builder.

use tower::{Layer, ServiceBuilder};

use super::service::HandlerService;
use super::traits::Handler;

/// Extension trait for [`tower::ServiceBuilder`] that finishes a decorator
/// chain with a handler function.
///
/// This trait is automatically available via `use cirrus::prelude::*`.
pub trait ServiceBuilderExt<L> {
    /// Wrap `handler` in a [`HandlerService`] and apply all stacked layers,
    /// returning the final composed service.
    ///
    /// Equivalent to `.service(HandlerService::new(handler))`.
    fn handler<H, T>(self, handler: H) -> L::Service
    where
        H: Handler<T>,
        L: Layer<HandlerService<H, T>>;
}

impl<L> ServiceBuilderExt<L> for ServiceBuilder<L> {
    fn handler<H, T>(self, handler: H) -> L::Service
    where
        H: Handler<T>,
        L: Layer<HandlerService<H, T>>,
    {
        self.service(HandlerService::new(handler))
    }
}
