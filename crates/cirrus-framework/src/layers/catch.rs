//! Error swallowing for functions whose caller ignores the result.

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::{Layer, Service, ServiceExt};
use tracing::error;

use cirrus_core::{InvocationError, Reply};

use crate::context::HandlerContext;

/// Turns every error of the wrapped service into an empty reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatchErrorsLayer;

impl CatchErrorsLayer {
    /// Creates the layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CatchErrorsLayer {
    type Service = CatchErrors<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CatchErrors { inner }
    }
}

/// The service produced by [`CatchErrorsLayer`].
#[derive(Debug, Clone)]
pub struct CatchErrors<S> {
    inner: S,
}

impl<S> Service<Arc<HandlerContext>> for CatchErrors<S>
where
    S: Service<Arc<HandlerContext>, Response = Reply, Error = InvocationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = Reply;
    type Error = InvocationError;
    type Future = BoxFuture<'static, Result<Reply, InvocationError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, ctx: Arc<HandlerContext>) -> Self::Future {
        let inner = self.inner.clone();
        async move {
            let request_id = ctx.invocation().request_id().to_string();
            match inner.oneshot(ctx).await {
                Ok(reply) => Ok(reply),
                Err(err) => {
                    error!(request_id = %request_id, error = %err, "Swallowed handler error");
                    Ok(Reply::empty())
                }
            }
        }
        .boxed()
    }
}

/// Swallows and logs every error of the wrapped chain.
pub fn catch_errors() -> CatchErrorsLayer {
    CatchErrorsLayer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ServiceBuilderExt;
    use crate::layers::test_support::context;
    use cirrus_core::HttpError;
    use serde_json::{Value, json};
    use tokio_test::block_on;
    use tower::ServiceBuilder;

    #[test]
    fn test_error_becomes_empty_reply() {
        let svc = ServiceBuilder::new()
            .layer(catch_errors())
            .handler(|| async { Err::<Value, _>(HttpError::internal("Catch me")) });

        let reply = block_on(svc.oneshot(context(json!({})))).unwrap();
        assert_eq!(reply, Reply::empty());
    }

    #[test]
    fn test_success_passes_through() {
        let svc = ServiceBuilder::new()
            .layer(catch_errors())
            .handler(|| async { "fine" });

        let reply = block_on(svc.oneshot(context(json!({})))).unwrap();
        assert_eq!(reply.body(), &json!("fine"));
    }
}
