//! The function entry point.
//!
//! A [`Function`] owns a composed pipeline and the shared [`Resources`], and
//! runs one invocation at a time:
//!
//! ```text
//! (event, context) ─▶ HandlerContext ─▶ pipeline ─▶ Reply ─▶ HttpResponse
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cirrus_runtime::{Function, init};
//!
//! init()?;
//! let function = Function::new(
//!     ServiceBuilder::new()
//!         .layer(http_response())
//!         .layer(domain_aware())
//!         .handler(list_items),
//! );
//!
//! let response = function.respond(event, context).await;
//! ```

use std::sync::Arc;

use serde_json::Value;
use tower::{Service, ServiceExt};
use tracing::{Instrument, debug, info, info_span};

use cirrus_core::{
    Event, HttpResponse, InvocationContext, InvocationError, InvocationResult, Reply, Resources,
};
use cirrus_framework::{HandlerContext, catch_panic, normalize, normalize_error};

use crate::config::{ConfigLoader, RuntimeConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// Loads the runtime configuration and initializes logging.
///
/// Call once per process, before the first invocation.
pub fn init() -> RuntimeResult<RuntimeConfig> {
    init_with(ConfigLoader::new())
}

/// Like [`init`], with a custom loader.
pub fn init_with(loader: ConfigLoader) -> RuntimeResult<RuntimeConfig> {
    let config = loader.load()?;
    logging::init_from_config(&config.logging);
    info!(log_level = %config.logging.level, "Runtime initialized");
    Ok(config)
}

/// A composed handler pipeline ready to serve invocations.
#[derive(Debug, Clone)]
pub struct Function<S> {
    service: S,
    resources: Arc<Resources>,
}

impl<S> Function<S>
where
    S: Service<Arc<HandlerContext>, Response = Reply, Error = InvocationError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    /// Wraps `service` with resources reading the process environment.
    pub fn new(service: S) -> Self {
        Self {
            service,
            resources: Arc::new(Resources::default()),
        }
    }

    /// Replaces the shared resources.
    pub fn with_resources(mut self, resources: impl Into<Arc<Resources>>) -> Self {
        self.resources = resources.into();
        self
    }

    /// The shared resources.
    pub fn resources(&self) -> &Arc<Resources> {
        &self.resources
    }

    /// Runs the pipeline and returns its raw outcome.
    pub async fn call(
        &self,
        event: impl Into<Event>,
        context: InvocationContext,
    ) -> InvocationResult<Reply> {
        let span = info_span!(
            "invocation",
            request_id = %context.request_id(),
            function = context.function_name().unwrap_or_default(),
        );

        let ctx = Arc::new(HandlerContext::new(
            event.into(),
            context,
            self.resources.clone(),
        ));
        let service = self.service.clone();
        async move {
            debug!("Invocation started");
            let result = service.oneshot(ctx).await;
            debug!(ok = result.is_ok(), "Invocation finished");
            result
        }
        .instrument(span)
        .await
    }

    /// Runs the pipeline and returns the response envelope. Never fails.
    ///
    /// Errors and panics escaping the pipeline are normalized the same way
    /// the `http_response` layer does it.
    pub async fn respond(&self, event: impl Into<Event>, context: InvocationContext) -> HttpResponse {
        let invocation = context.clone();
        let reply = match catch_panic(self.call(event, context)).await {
            Ok(reply) => normalize(reply),
            Err(err) => normalize_error(err, &invocation, None),
        };
        reply.into_response()
    }

    /// Runs the pipeline for an event-driven function and returns the reply body.
    ///
    /// Skipped events yield `null`; other errors are returned to the caller.
    pub async fn handle(
        &self,
        event: impl Into<Event>,
        context: InvocationContext,
    ) -> InvocationResult<Value> {
        match self.call(event, context).await {
            Ok(reply) => Ok(reply.into_parts().1),
            Err(InvocationError::Skipped(skipped)) => {
                debug!(reason = skipped.reason(), "Event skipped");
                Ok(Value::Null)
            }
            Err(err) => Err(err),
        }
    }

    /// Parses a raw JSON event and responds to it.
    pub async fn respond_raw(
        &self,
        raw_event: &str,
        context: InvocationContext,
    ) -> RuntimeResult<HttpResponse> {
        let event: Value = serde_json::from_str(raw_event)?;
        Ok(self.respond(event, context).await)
    }
}

#[cfg(test)]
mod tests {
    use cirrus_core::{HttpError, MapEnvironment};
    use cirrus_framework::prelude::*;
    use serde_json::json;

    use super::*;

    fn context() -> InvocationContext {
        InvocationContext::new(
            "request-1",
            "arn:aws:lambda:us-east-1:123456789012:function:demo.say_hello",
        )
    }

    fn resources() -> Resources {
        Resources::builder()
            .environment(MapEnvironment::new().with("NAMESPACE", "test-ns"))
            .build()
    }

    #[tokio::test]
    async fn test_respond_without_normalizer_layer() {
        let function = Function::new(
            ServiceBuilder::new()
                .layer(namespace_aware())
                .handler(|ns: Namespace| async move { json!({"namespace": ns.as_str()}) }),
        )
        .with_resources(resources());

        let response = function.respond(json!({}), context()).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.json_body::<Value>().unwrap(),
            json!({"namespace": "test-ns"})
        );

        let response = Function::new(function.service.clone())
            .with_resources(Resources::builder().environment(MapEnvironment::new()).build())
            .respond(json!({}), context())
            .await;
        assert_eq!(response.status_code, 500);
    }

    #[tokio::test]
    async fn test_respond_matches_normalizer_layer() {
        let handler = || async { Err::<Value, _>(HttpError::forbidden("nope")) };
        let bare = Function::new(ServiceBuilder::new().handler(handler));
        let wrapped = Function::new(ServiceBuilder::new().layer(http_response()).handler(handler));

        assert_eq!(
            bare.respond(json!({}), context()).await,
            wrapped.respond(json!({}), context()).await
        );
    }

    #[tokio::test]
    async fn test_unhandled_error_message() {
        let function = Function::new(
            ServiceBuilder::new()
                .handler(|| async { Err::<Value, cirrus_core::BoxError>("boom".into()) }),
        );

        let response = function.respond(json!({}), context()).await;
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("say hello"));
    }

    #[tokio::test]
    async fn test_panic_without_normalizer_layer() {
        let function = Function::new(ServiceBuilder::new().handler(|event: Arc<Event>| async move {
            let divisor = event.as_value()["divisor"].as_i64().unwrap_or_default();
            json!(1 / divisor)
        }));

        let response = function.respond(json!({"divisor": 0}), context()).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Unhandled error in say hello");

        let response = function.respond(json!({"divisor": 1}), context()).await;
        assert_eq!(response.body, "1");
    }

    #[tokio::test]
    async fn test_handle_subscriber() {
        let function = Function::new(
            ServiceBuilder::new()
                .layer(subscriber(&["orders"]))
                .handler(|Message(message): Message<Value>| async move { message }),
        );

        let event = |topic: &str| {
            json!({"Records": [{"Sns": {
                "TopicArn": format!("arn:aws:sns:us-east-1:123456789012:test-ns-{topic}"),
                "Message": r#"{"id": 7}"#,
            }}]})
        };

        assert_eq!(
            function.handle(event("orders"), context()).await.unwrap(),
            json!({"id": 7})
        );
        assert_eq!(
            function.handle(event("payments"), context()).await.unwrap(),
            Value::Null
        );
        assert!(function.handle(json!({}), context()).await.is_err());
    }

    #[tokio::test]
    async fn test_respond_raw() {
        let function = Function::new(ServiceBuilder::new().handler(|| async { "ok" }));

        let response = function.respond_raw("{}", context()).await.unwrap();
        assert_eq!(response.body, "ok");
        assert!(function.respond_raw("{", context()).await.is_err());
    }
}
