//! Handler outcomes and the response envelope.
//!
//! Handlers return anything implementing [`IntoReply`]. Layers pass the
//! resulting [`Reply`] outward, possibly adding headers, until it is turned
//! into the wire-level [`HttpResponse`]:
//!
//! ```text
//! handler → IntoReply → Reply → (layers) → Reply::into_response → HttpResponse
//! ```
//!
//! A JSON object that contains `statusCode` or `body` is an explicit response
//! object and keeps its status, body and headers. Any other value becomes the
//! body of a 200 response.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::error::{InvocationError, InvocationResult};

/// Status code used when neither the handler nor a layer chose one.
pub const DEFAULT_STATUS_CODE: u16 = 200;

// ============================================================================
// Reply
// ============================================================================

/// The outcome of a handler as it travels back through the layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    status_code: Option<u16>,
    body: Value,
    headers: BTreeMap<String, String>,
}

impl Reply {
    /// A reply whose body is `body` and whose status is left to the default.
    pub fn new(body: impl Into<Value>) -> Self {
        Self {
            status_code: None,
            body: body.into(),
            headers: BTreeMap::new(),
        }
    }

    /// A reply with a `null` body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A reply with an explicit status.
    pub fn with_status(status_code: u16, body: impl Into<Value>) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::new(body)
        }
    }

    /// Serializes any value into a reply body.
    ///
    /// Set-like containers (`HashSet`, `BTreeSet`) become JSON arrays; the
    /// order of a `HashSet` is unspecified.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Interprets a handler's JSON return value.
    ///
    /// A `statusCode` may be a number or a numeric string; any other
    /// non-null value fails with [`InvalidStatusCode`].
    pub fn from_value(value: Value) -> InvocationResult<Self> {
        match value {
            Value::Object(mut map) if map.contains_key("statusCode") || map.contains_key("body") => {
                let status_code = map
                    .remove("statusCode")
                    .map(parse_status_code)
                    .transpose()
                    .map_err(InvocationError::other)?
                    .flatten();
                let body = map.remove("body").unwrap_or(Value::Null);
                let headers = match map.remove("headers") {
                    Some(Value::Object(headers)) => headers
                        .into_iter()
                        .map(|(name, value)| (name, serialize_body(value)))
                        .collect(),
                    _ => BTreeMap::new(),
                };
                Ok(Self {
                    status_code,
                    body,
                    headers,
                })
            }
            other => Ok(Self::new(other)),
        }
    }

    /// The explicit status code, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The body payload.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Response headers added so far.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Sets the status code.
    pub fn set_status_code(&mut self, status_code: u16) {
        self.status_code = Some(status_code);
    }

    /// Adds or replaces a response header.
    pub fn insert_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`insert_header`](Self::insert_header).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Splits into status, body and headers.
    pub fn into_parts(self) -> (Option<u16>, Value, BTreeMap<String, String>) {
        (self.status_code, self.body, self.headers)
    }

    /// Converts into the wire envelope.
    ///
    /// The status defaults to 200, a string body is passed through verbatim
    /// and any other body is serialized to JSON. Headers are omitted when empty.
    pub fn into_response(self) -> HttpResponse {
        HttpResponse {
            status_code: self.status_code.unwrap_or(DEFAULT_STATUS_CODE),
            body: serialize_body(self.body),
            headers: (!self.headers.is_empty()).then_some(self.headers),
        }
    }
}

impl From<HttpResponse> for Reply {
    fn from(response: HttpResponse) -> Self {
        Self {
            status_code: Some(response.status_code),
            body: Value::String(response.body),
            headers: response.headers.unwrap_or_default(),
        }
    }
}

/// An explicit `statusCode` that is not a valid HTTP status.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid status code: {0}")]
pub struct InvalidStatusCode(pub Value);

fn parse_status_code(value: Value) -> Result<Option<u16>, InvalidStatusCode> {
    let code = match &value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_u64().and_then(|code| u16::try_from(code).ok()),
        Value::String(text) => text.trim().parse::<u16>().ok(),
        _ => None,
    };
    code.filter(|code| (100..=999).contains(code))
        .map(Some)
        .ok_or(InvalidStatusCode(value))
}

/// Renders a body value for the wire: strings verbatim, anything else as JSON.
pub fn serialize_body(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

// ============================================================================
// HttpResponse
// ============================================================================

/// The response envelope expected by HTTP event sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Response status code.
    pub status_code: u16,
    /// Serialized response body.
    pub body: String,
    /// Optional response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

impl HttpResponse {
    /// Creates an envelope without headers.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
            headers: None,
        }
    }

    /// Parses the body as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Looks up a header by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref()?.get(name).map(String::as_str)
    }
}

// ============================================================================
// IntoReply
// ============================================================================

/// Types that handlers may return.
pub trait IntoReply: Send + 'static {
    /// Converts the handler outcome into a reply or a pipeline error.
    fn into_reply(self) -> InvocationResult<Reply>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(self)
    }
}

impl IntoReply for HttpResponse {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(self.into())
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> InvocationResult<Reply> {
        Reply::from_value(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(Reply::new(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(Reply::new(self))
    }
}

/// Implementation for `()` - an empty reply.
impl IntoReply for () {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(Reply::empty())
    }
}

/// Implementation for `Option<T>` - `None` is an empty reply.
impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> InvocationResult<Reply> {
        self.map_or_else(|| Ok(Reply::empty()), IntoReply::into_reply)
    }
}

/// Implementation for `Result<T, E>` - errors enter the pipeline's error channel.
impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<InvocationError> + Send + 'static,
{
    fn into_reply(self) -> InvocationResult<Reply> {
        self.map_err(Into::into).and_then(IntoReply::into_reply)
    }
}

/// Serializes any `Serialize` value as the reply body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T: Serialize + Send + 'static> IntoReply for Json<T> {
    fn into_reply(self) -> InvocationResult<Reply> {
        Ok(Reply::json(&self.0)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_value_becomes_body() {
        let response = Reply::from_value(json!({"foo": "bar"}))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.json_body::<Value>().unwrap(), json!({"foo": "bar"}));
        assert!(response.headers.is_none());
    }

    #[test]
    fn test_explicit_response_object() {
        let response = Reply::from_value(json!({
            "statusCode": 500,
            "body": {"foo": "bar"},
            "headers": {"X-Test": "1"}
        }))
        .unwrap()
        .into_response();

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, r#"{"foo":"bar"}"#);
        assert_eq!(response.header("X-Test"), Some("1"));
    }

    #[test]
    fn test_body_without_status_defaults_to_200() {
        let response = Reply::from_value(json!({"body": "Hello, World!"}))
            .unwrap()
            .into_response();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, "Hello, World!");
    }

    #[test]
    fn test_status_code_forms() {
        let reply = Reply::from_value(json!({"statusCode": "404", "body": "nope"})).unwrap();
        assert_eq!(reply.into_response().status_code, 404);

        let reply = Reply::from_value(json!({"statusCode": null, "body": "ok"})).unwrap();
        assert_eq!(reply.status_code(), None);

        for bad in [json!(70000), json!("teapot"), json!(-1), json!(4.5), json!(true)] {
            let err = Reply::from_value(json!({"statusCode": bad.clone(), "body": "x"})).unwrap_err();
            assert!(matches!(err, InvocationError::Other(_)));
            assert!(err.to_string().contains(&bad.to_string()));
        }
    }

    #[test]
    fn test_sets_serialize_as_sequences() {
        let set: HashSet<&str> = ["m", "n", "o"].into_iter().collect();
        let body = json!({"a": 1, "b": Reply::json(&set).unwrap().body().clone()});
        let response = Reply::new(body).into_response();

        let mut parsed: Value = response.json_body().unwrap();
        let mut b: Vec<String> = serde_json::from_value(parsed["b"].take()).unwrap();
        b.sort();
        assert_eq!(b, vec!["m", "n", "o"]);
        assert_eq!(parsed["a"], json!(1));
    }

    #[test]
    fn test_envelope_wire_shape() {
        let response = Reply::with_status(201, "created")
            .with_header("Location", "/items/1")
            .into_response();
        let wire = serde_json::to_value(&response).unwrap();
        assert_eq!(
            wire,
            json!({"statusCode": 201, "body": "created", "headers": {"Location": "/items/1"}})
        );

        let bare = serde_json::to_value(HttpResponse::new(200, "ok")).unwrap();
        assert_eq!(bare, json!({"statusCode": 200, "body": "ok"}));
    }

    #[test]
    fn test_result_into_reply() {
        let ok: Result<Value, InvocationError> = Ok(json!(1));
        assert_eq!(ok.into_reply().unwrap().body(), &json!(1));

        let err: Result<Value, super::super::error::HttpError> =
            Err(super::super::error::HttpError::forbidden("no"));
        let err = err.into_reply().unwrap_err();
        assert_eq!(err.status_parts().map(|(code, _)| code), Some(403));
    }
}
