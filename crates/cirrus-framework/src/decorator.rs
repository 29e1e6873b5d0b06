//! The single-concern decorator abstraction.
//!
//! Most decorators follow the same shape: inspect the context, inject a few
//! named values or fail, call the inner service, and optionally touch up the
//! reply on the way out. [`Decorator`] captures that shape and
//! [`DecoratorLayer`] turns any implementation into a tower [`Layer`].
//!
//! ```text
//!            ┌──────────── DecoratorService ────────────┐
//! ctx ──────▶│ before(ctx) ──▶ inner.call(ctx) ──▶ after │──────▶ Reply
//!            │     │ Err                                 │
//!            └─────┴─────────────────────────────────────┘──────▶ InvocationError
//! ```
//!
//! When `before` fails the inner service is never called.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tower::{Layer, Service, ServiceExt};

use cirrus_core::{InvocationError, InvocationResult, Reply};

use crate::context::HandlerContext;

/// One cross-cutting concern of the handler pipeline.
pub trait Decorator: Clone + Send + Sync + 'static {
    /// Carried from [`before`](Self::before) to [`after`](Self::after).
    type State: Send + 'static;

    /// Validates the context and injects values for the handler.
    fn before(&self, ctx: &HandlerContext) -> InvocationResult<Self::State>;

    /// Post-processes a successful reply.
    fn after(&self, _state: Self::State, reply: Reply) -> Reply {
        reply
    }
}

/// Applies a [`Decorator`] to the wrapped service.
#[derive(Debug, Clone)]
pub struct DecoratorLayer<D> {
    pub(crate) decorator: D,
}

impl<D> DecoratorLayer<D> {
    /// Wraps a decorator.
    pub fn new(decorator: D) -> Self {
        Self { decorator }
    }

    /// Returns the wrapped decorator.
    pub fn decorator(&self) -> &D {
        &self.decorator
    }
}

impl<S, D: Clone> Layer<S> for DecoratorLayer<D> {
    type Service = DecoratorService<S, D>;

    fn layer(&self, inner: S) -> Self::Service {
        DecoratorService {
            inner,
            decorator: self.decorator.clone(),
        }
    }
}

/// The service produced by [`DecoratorLayer`].
#[derive(Debug, Clone)]
pub struct DecoratorService<S, D> {
    inner: S,
    decorator: D,
}

impl<S, D> Service<Arc<HandlerContext>> for DecoratorService<S, D>
where
    S: Service<Arc<HandlerContext>, Response = Reply, Error = InvocationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    D: Decorator,
{
    type Response = Reply;
    type Error = InvocationError;
    type Future = BoxFuture<'static, Result<Reply, InvocationError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, ctx: Arc<HandlerContext>) -> Self::Future {
        let state = match self.decorator.before(&ctx) {
            Ok(state) => state,
            Err(err) => return future::ready(Err(err)).boxed(),
        };

        let decorator = self.decorator.clone();
        let inner = self.inner.clone();
        async move {
            let reply = inner.oneshot(ctx).await?;
            Ok(decorator.after(state, reply))
        }
        .boxed()
    }
}
