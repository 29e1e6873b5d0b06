//! The response normalizer, the outermost layer of an HTTP function.
//!
//! Whatever the wrapped chain produces, the normalizer turns it into a reply
//! whose status is set and whose body is already serialized:
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | reply | its status, or 200 | serialized unless already a string |
//! | [`StatusError`](cirrus_core::StatusError) | the error's status | the error's body |
//! | skipped event | 200 | `null` |
//! | anything else | 500 | the default error message |
//! | panic in the chain | 500 | the default error message |
//!
//! The output is still a [`Reply`], so layers stacked outside the normalizer
//! compose as usual.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use thiserror::Error;
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, error, warn};

use cirrus_core::foundation::reply::{DEFAULT_STATUS_CODE, serialize_body};
use cirrus_core::{InvocationContext, InvocationError, InvocationResult, Reply};

use crate::context::HandlerContext;

/// Message used when no function name is known.
pub const FALLBACK_ERROR_MESSAGE: &str = "Internal server error";

/// A handler or layer panicked while serving the invocation.
#[derive(Debug, Error)]
#[error("handler panicked: {0}")]
pub struct HandlerPanicked(pub String);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Awaits `future`, turning a panic into an unhandled [`HandlerPanicked`] error.
pub async fn catch_panic<F>(future: F) -> InvocationResult<Reply>
where
    F: Future<Output = InvocationResult<Reply>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(InvocationError::other(HandlerPanicked(panic_message(
            payload.as_ref(),
        )))),
    }
}

/// Sets the status and serializes the body of a successful reply.
pub fn normalize(reply: Reply) -> Reply {
    let (status_code, body, headers) = reply.into_parts();
    headers.into_iter().fold(
        Reply::with_status(
            status_code.unwrap_or(DEFAULT_STATUS_CODE),
            Value::String(serialize_body(body)),
        ),
        |reply, (name, value)| reply.with_header(name, value),
    )
}

/// The 500 message used for an invocation when none is configured.
///
/// Derived from the function name: `handlers.get_user` gives
/// `"Unhandled error in get user"`.
pub fn default_error_message(invocation: &InvocationContext) -> String {
    invocation
        .readable_function_name()
        .map(|name| format!("Unhandled error in {name}"))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Converts a pipeline error into a normalized reply.
pub fn normalize_error(
    err: InvocationError,
    invocation: &InvocationContext,
    default_message: Option<&str>,
) -> Reply {
    if let InvocationError::Skipped(skipped) = &err {
        debug!(reason = skipped.reason(), "Event skipped");
        return normalize(Reply::with_status(DEFAULT_STATUS_CODE, Value::Null));
    }

    if let Some((status_code, body)) = err.status_parts() {
        warn!(status_code, error = %err, "Request failed");
        return normalize(Reply::with_status(status_code, body));
    }

    error!(
        request_id = invocation.request_id(),
        error = %err,
        "Unhandled error"
    );
    let message = default_message
        .map(str::to_string)
        .unwrap_or_else(|| default_error_message(invocation));
    Reply::with_status(500, message)
}

/// Normalizes the outcome of the wrapped service. Never fails.
#[derive(Debug, Clone, Default)]
pub struct HttpResponseLayer {
    default_error_message: Option<Arc<str>>,
}

impl HttpResponseLayer {
    /// Creates a normalizer that derives its 500 message from the function name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `message` as the body of every unhandled-error reply.
    pub fn default_error_message(mut self, message: impl Into<String>) -> Self {
        self.default_error_message = Some(message.into().into());
        self
    }
}

impl<S> Layer<S> for HttpResponseLayer {
    type Service = HttpResponseService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HttpResponseService {
            inner,
            default_error_message: self.default_error_message.clone(),
        }
    }
}

/// The service produced by [`HttpResponseLayer`].
#[derive(Debug, Clone)]
pub struct HttpResponseService<S> {
    inner: S,
    default_error_message: Option<Arc<str>>,
}

impl<S> Service<Arc<HandlerContext>> for HttpResponseService<S>
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
        let default_message = self.default_error_message.clone();
        async move {
            let invocation = ctx.invocation_arc();
            Ok(match catch_panic(inner.oneshot(ctx)).await {
                Ok(reply) => normalize(reply),
                Err(err) => normalize_error(err, &invocation, default_message.as_deref()),
            })
        }
        .boxed()
    }
}

/// Wraps a chain so that every outcome becomes a normalized reply.
///
/// ```rust,ignore
/// let svc = ServiceBuilder::new()
///     .layer(http_response().default_error_message("Could not list items"))
///     .layer(domain_aware())
///     .handler(list_items);
/// ```
pub fn http_response() -> HttpResponseLayer {
    HttpResponseLayer::new()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::handler::ServiceBuilderExt;
    use crate::layers::test_support::context;
    use cirrus_core::{BoxError, Event, EventSkipped, HttpError, Json, Resources};
    use serde_json::json;
    use tokio_test::block_on;
    use tower::ServiceBuilder;

    fn context_named(function_name: &str) -> Arc<HandlerContext> {
        Arc::new(HandlerContext::new(
            Event::default(),
            InvocationContext::new("request-1", "arn").with_function_name(function_name),
            Arc::new(Resources::default()),
        ))
    }

    fn failing() -> Result<Value, BoxError> {
        Err("division by zero".into())
    }

    #[test]
    fn test_plain_value() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|event: Arc<Event>| async move { json!({"event": event.as_value()}) });

        let response = block_on(svc.oneshot(context(json!({"foo": "bar"}))))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 200);
        let body: Value = response.json_body().unwrap();
        assert_eq!(body["event"], json!({"foo": "bar"}));
    }

    #[test]
    fn test_explicit_status_code() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|| async { json!({"statusCode": 500, "body": {"foo": "bar"}}) });

        let response = block_on(svc.oneshot(context(json!({}))))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.json_body::<Value>().unwrap(), json!({"foo": "bar"}));
    }

    #[test]
    fn test_string_and_invalid_status_codes() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|event: Arc<Event>| async move { event.as_value().clone() });

        let event = json!({"statusCode": "404", "body": "nope"});
        let response = block_on(svc.clone().oneshot(context(event)))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body, "nope");

        let event = json!({"statusCode": 70000, "body": "nope"});
        let response = block_on(svc.oneshot(context(event)))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 500);
        assert_ne!(response.body, "nope");
    }

    #[test]
    fn test_set_body_becomes_list() {
        let svc = ServiceBuilder::new().layer(http_response()).handler(|| async {
            let tags: BTreeSet<&str> = ["m", "n", "o"].into_iter().collect();
            Json(json!({"a": 1, "b": tags, "d": [1, "2", true]}))
        });

        let response = block_on(svc.oneshot(context(json!({}))))
            .unwrap()
            .into_response();
        assert_eq!(
            response.json_body::<Value>().unwrap(),
            json!({"a": 1, "b": ["m", "n", "o"], "d": [1, "2", true]})
        );
    }

    #[test]
    fn test_configured_error_message() {
        let svc = ServiceBuilder::new()
            .layer(http_response().default_error_message("Blarg"))
            .handler(|| async { failing() });

        let response = block_on(svc.oneshot(context_named("foo.my_func")))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Blarg");
    }

    #[test]
    fn test_computed_error_message() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|| async { failing() });

        let response = block_on(svc.oneshot(context_named("foo.my_func")))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("my func"));
    }

    #[test]
    fn test_panicking_handler_becomes_500() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|event: Arc<Event>| async move {
                let divisor = event.as_value()["divisor"].as_i64().unwrap_or_default();
                json!(1 / divisor)
            });

        let response = block_on(svc.oneshot(context_named("foo.my_func")))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Unhandled error in my func");
    }

    #[test]
    fn test_catch_panic_keeps_results() {
        let ok = block_on(catch_panic(async { Ok(Reply::new(json!(1))) })).unwrap();
        assert_eq!(ok.body(), &json!(1));

        let missing: Option<Value> = None;
        let err = block_on(catch_panic(async { Ok(Reply::new(missing.expect("boom"))) }))
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_status_error() {
        let svc = ServiceBuilder::new().layer(http_response()).handler(|| async {
            Err::<Value, _>(HttpError::new(403, json!({"some": "auth error"})))
        });

        let response = block_on(svc.oneshot(context(json!({}))))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 403);
        assert_eq!(
            response.json_body::<Value>().unwrap(),
            json!({"some": "auth error"})
        );
    }

    #[test]
    fn test_boxed_http_error_keeps_status() {
        let svc = ServiceBuilder::new().layer(http_response()).handler(|| async {
            Err::<Value, BoxError>(Box::new(HttpError::new(420, json!({"some": "random error"}))))
        });

        let response = block_on(svc.oneshot(context(json!({}))))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 420);
    }

    #[test]
    fn test_skipped_event() {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(|| async { Err::<Value, _>(EventSkipped::new("not for us")) });

        let response = block_on(svc.oneshot(context(json!({}))))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "null");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(Reply::new(json!({"a": 1})).with_header("x", "y"));
        assert_eq!(normalize(once.clone()), once);
        assert_eq!(once.status_code(), Some(200));
        assert_eq!(once.body(), &json!(r#"{"a":1}"#));
    }

    #[test]
    fn test_default_error_message_without_name() {
        assert_eq!(
            default_error_message(&InvocationContext::default()),
            FALLBACK_ERROR_MESSAGE
        );
    }
}
