//! Core handler service for the Cirrus framework.
//!
//! [`HandlerService<H, T>`] is the fundamental building block: it wraps a
//! single handler and implements `tower::Service<Arc<HandlerContext>>`. Every
//! decorator is an ordinary tower [`Layer`](tower::Layer) stacked *on top*.

use std::marker::PhantomData;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;

use cirrus_core::{InvocationError, Reply};

use super::traits::Handler;
use crate::context::HandlerContext;

/// A tower [`Service`] that calls a single generic handler.
///
/// Holds the handler directly with no heap allocation.
///
/// # Example
///
/// ```rust,ignore
/// let svc = HandlerService::new(my_handler);
/// let decorated = ServiceBuilder::new().layer(domain_aware()).service(svc);
/// ```
pub struct HandlerService<H, T> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<H, T> HandlerService<H, T> {
    /// Wraps a handler.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<H: Clone, T> Clone for HandlerService<H, T> {
    fn clone(&self) -> Self {
        HandlerService {
            handler: self.handler.clone(),
            _marker: PhantomData,
        }
    }
}

impl<H, T> Service<Arc<HandlerContext>> for HandlerService<H, T>
where
    H: Handler<T>,
{
    type Response = Reply;
    type Error = InvocationError;
    type Future = BoxFuture<'static, Result<Reply, InvocationError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, ctx: Arc<HandlerContext>) -> Self::Future {
        Handler::call(self.handler.clone(), ctx)
    }
}
