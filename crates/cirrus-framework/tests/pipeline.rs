use std::sync::Arc;

use cirrus_core::{
    BoxError, Event, HttpResponse, InvocationContext, MapEnvironment, Resources,
};
use cirrus_framework::prelude::*;
use serde_json::{Value, json};
use tokio_test::block_on;

const ORIGIN_PATTERN: &str = r".*\.example\.com";

fn context(event: Value, env: MapEnvironment) -> Arc<HandlerContext> {
    Arc::new(HandlerContext::new(
        Event::new(event),
        InvocationContext::new(
            "request-1",
            "arn:aws:lambda:us-east-1:123456789012:function:items.create_item",
        ),
        Arc::new(Resources::builder().environment(env).build()),
    ))
}

fn respond<S>(svc: S, ctx: Arc<HandlerContext>) -> HttpResponse
where
    S: tower::Service<
            Arc<HandlerContext>,
            Response = cirrus_core::Reply,
            Error = cirrus_core::InvocationError,
        >,
{
    block_on(svc.oneshot(ctx)).unwrap().into_response()
}

async fn create_item(
    domain: Domain,
    origin: RequestOrigin,
    Body(item): Body<Value>,
) -> Value {
    json!({
        "domain": domain.as_str(),
        "origin": origin.as_str(),
        "item": item,
    })
}

fn create_event(origin: &str) -> Value {
    json!({
        "headers": {"Origin": origin},
        "body": r#"{"name": "widget"}"#,
        "requestContext": {"authorizer": {"domain": "test.com"}},
    })
}

#[test]
fn origin_and_normalizer_compose_in_either_order() {
    let outer_normalizer = ServiceBuilder::new()
        .layer(http_response())
        .layer(allow_origin_response(ORIGIN_PATTERN).unwrap())
        .layer(domain_aware())
        .layer(body(&["name"], &[]))
        .handler(create_item);

    let inner_normalizer = ServiceBuilder::new()
        .layer(allow_origin_response(ORIGIN_PATTERN).unwrap())
        .layer(http_response())
        .layer(domain_aware())
        .layer(body(&["name"], &[]))
        .handler(create_item);

    let event = create_event("https://app.example.com");
    let first = respond(outer_normalizer, context(event.clone(), MapEnvironment::new()));
    let second = respond(inner_normalizer, context(event, MapEnvironment::new()));

    assert_eq!(first, second);
    assert_eq!(first.status_code, 200);
    assert_eq!(
        first.header("Access-Control-Allow-Origin"),
        Some("https://app.example.com")
    );
    assert_eq!(first.header("Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(
        first.json_body::<Value>().unwrap(),
        json!({
            "domain": "test.com",
            "origin": "https://app.example.com",
            "item": {"name": "widget"},
        })
    );
}

#[test]
fn decorators_commute_for_valid_requests() {
    let env = || MapEnvironment::new().with("NAMESPACE", "test-ns");
    let handler = |ctx: Arc<HandlerContext>| async move { json!(ctx.extras()) };

    let a = ServiceBuilder::new()
        .layer(http_response())
        .layer(namespace_aware())
        .layer(domain_aware())
        .handler(handler);
    let b = ServiceBuilder::new()
        .layer(http_response())
        .layer(domain_aware())
        .layer(namespace_aware())
        .handler(handler);

    let event = json!({"requestContext": {"authorizer": {"domain": "test.com"}}});
    assert_eq!(
        respond(a, context(event.clone(), env())),
        respond(b, context(event, env()))
    );
}

#[test]
fn rejected_origin_never_reaches_handler() {
    let svc = ServiceBuilder::new()
        .layer(http_response())
        .layer(allow_origin_response(ORIGIN_PATTERN).unwrap())
        .layer(domain_aware())
        .layer(body(&["name"], &[]))
        .handler(create_item);

    let response = respond(svc, context(create_event("https://evil.com"), MapEnvironment::new()));
    assert_eq!(response.status_code, 403);
    assert!(response.headers.is_none());
}

#[test]
fn first_failing_decorator_wins() {
    let svc = ServiceBuilder::new()
        .layer(http_response())
        .layer(scopes(["read", "write"]))
        .layer(body(&["a"], &[]))
        .handler(|Body(body): Body<Value>| async move { body });

    let event = json!({
        "body": "",
        "requestContext": {"authorizer": {"scopes": "read"}},
    });
    let response = respond(svc, context(event, MapEnvironment::new()));
    assert_eq!(response.status_code, 403);
    assert!(response.body.contains("insufficient"));
}

#[test]
fn parameters_reach_handler_through_extras() {
    let svc = ServiceBuilder::new()
        .layer(http_response())
        .layer(
            parameters()
                .required_querystring(["a", "b"])
                .optional_querystring(["c", "d"])
                .path(["e", "f"]),
        )
        .handler(|extras: Extras| async move { Value::Object(extras.into_inner()) });

    let ok = json!({
        "queryStringParameters": {"a": "1", "b": "2", "c": "1", "d": "2"},
        "pathParameters": {"e": "1", "f": "2"},
    });
    let response = respond(svc.clone(), context(ok, MapEnvironment::new()));
    assert_eq!(response.status_code, 200);
    assert_eq!(response.json_body::<Value>().unwrap().as_object().unwrap().len(), 6);

    let missing = json!({
        "queryStringParameters": {"b": "2"},
        "pathParameters": {"e": "1", "f": "2"},
    });
    let response = respond(svc, context(missing, MapEnvironment::new()));
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid"));
}

#[test]
fn plain_errors_become_non_empty_500() {
    for message in ["boom", ""] {
        let svc = ServiceBuilder::new()
            .layer(http_response())
            .handler(move || async move { Err::<Value, BoxError>(message.into()) });

        let response = respond(svc, context(json!({}), MapEnvironment::new()));
        assert_eq!(response.status_code, 500);
        assert!(!response.body.is_empty());
        assert!(response.body.contains("create item"));
    }
}

#[test]
fn missing_extractor_is_unhandled() {
    let svc = ServiceBuilder::new()
        .layer(http_response())
        .handler(|domain: Domain| async move { domain.0 });

    let response = respond(svc, context(json!({}), MapEnvironment::new()));
    assert_eq!(response.status_code, 500);
}

#[test]
fn subscriber_skip_is_null() {
    let svc = ServiceBuilder::new()
        .layer(http_response())
        .layer(subscriber(&["orders"]))
        .handler(|Message(message): Message<Value>| async move { message });

    let event = json!({"Records": [{"Sns": {
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:test-ns-payments",
        "Message": "{}",
    }}]});
    let response = respond(svc, context(event, MapEnvironment::new()));
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, "null");
}
