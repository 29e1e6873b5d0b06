//! Inbound event model.
//!
//! An [`Event`] is the raw JSON document a serverless platform hands to a
//! function. Its shape depends on the trigger:
//!
//! - **HTTP** (API gateway proxy): `headers`, `queryStringParameters`,
//!   `pathParameters`, `body`, `isBase64Encoded` and the authorizer claims under
//!   `requestContext.authorizer`
//! - **Pub/sub** (notification fan-out): `Records[0].Sns.{TopicArn, Message}`
//!
//! The event is read-only. Layers re-derive whatever they need from it on every
//! call instead of relying on another layer having run first.
//!
//! # Example
//!
//! ```rust,ignore
//! use cirrus_core::Event;
//! use serde_json::json;
//!
//! let event = Event::new(json!({
//!     "headers": { "Origin": "https://app.example.com" },
//!     "requestContext": { "authorizer": { "sub": "user-1" } }
//! }));
//!
//! assert_eq!(event.header("origin"), Some("https://app.example.com"));
//! assert_eq!(event.authorizer_claim("sub").and_then(|v| v.as_str()), Some("user-1"));
//! ```

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Value helpers
// ============================================================================

/// Safely walks nested objects along `path`.
///
/// Returns `None` as soon as a segment is missing or the current value is not
/// an object.
pub fn deep_get<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Like [`deep_get`], but compares every key ASCII-case-insensitively.
pub fn deep_get_ignore_case<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| {
        current
            .as_object()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Returns the subset of `map` whose keys appear in `keys`.
///
/// Keys that are not present in `map` are ignored.
pub fn select_keys<'a, I>(map: &Map<String, Value>, keys: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .filter_map(|k| map.get(k).map(|v| (k.to_string(), v.clone())))
        .collect()
}

// ============================================================================
// Event
// ============================================================================

/// The inbound request or message, as an opaque JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Value);

impl Event {
    /// Wraps a raw JSON event.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON document.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the event, returning the underlying JSON document.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Nested lookup from the event root. See [`deep_get`].
    pub fn deep_get(&self, path: &[&str]) -> Option<&Value> {
        deep_get(&self.0, path)
    }

    /// Case-insensitive nested lookup from the event root.
    pub fn deep_get_ignore_case(&self, path: &[&str]) -> Option<&Value> {
        deep_get_ignore_case(&self.0, path)
    }

    // ─── HTTP shape ──────────────────────────────────────────────────────────

    /// Returns the request headers, if the event carries any.
    pub fn headers(&self) -> Option<&Map<String, Value>> {
        self.0.get("headers")?.as_object()
    }

    /// Looks up a header by name, ignoring case.
    ///
    /// Edge proxies are free to rewrite header casing, so `Origin`, `origin`
    /// and `ORIGIN` all resolve to the same value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.deep_get_ignore_case(&["headers", name])?.as_str()
    }

    /// Returns the query string parameter map.
    pub fn query_parameters(&self) -> Option<&Map<String, Value>> {
        self.0.get("queryStringParameters")?.as_object()
    }

    /// Returns the path parameter map.
    pub fn path_parameters(&self) -> Option<&Map<String, Value>> {
        self.0.get("pathParameters")?.as_object()
    }

    /// Returns the raw request body.
    pub fn body(&self) -> Option<&str> {
        self.0.get("body")?.as_str()
    }

    /// Whether the gateway base64-encoded the body.
    pub fn is_base64_encoded(&self) -> bool {
        self.0
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns a claim placed on the request by the upstream authorizer.
    ///
    /// `null` claims are reported as absent.
    pub fn authorizer_claim(&self, claim: &str) -> Option<&Value> {
        self.deep_get(&["requestContext", "authorizer", claim])
            .filter(|v| !v.is_null())
    }

    // ─── Pub/sub shape ───────────────────────────────────────────────────────

    /// Returns the first notification record, if the event has that shape.
    pub fn first_sns_record(&self) -> Option<SnsRecord<'_>> {
        let sns = self.0.get("Records")?.as_array()?.first()?.get("Sns")?;
        Some(SnsRecord {
            topic_arn: sns.get("TopicArn")?.as_str()?,
            message: sns.get("Message")?,
        })
    }
}

impl Deref for Event {
    type Target = Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A borrowed view of one pub/sub notification record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnsRecord<'a> {
    /// ARN of the topic the message was published to.
    pub topic_arn: &'a str,
    /// The message payload, normally a JSON-encoded string.
    pub message: &'a Value,
}

impl SnsRecord<'_> {
    /// The topic name, i.e. the last `:`-separated segment of the ARN.
    pub fn topic_name(&self) -> &str {
        self.topic_arn.rsplit(':').next().unwrap_or(self.topic_arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_get() {
        let value = json!({"foo": {"bar": "baz"}});
        assert_eq!(deep_get(&value, &["foo", "bar"]), Some(&json!("baz")));
        assert_eq!(deep_get(&value, &["foo", "BLARG"]), None);
        assert_eq!(deep_get(&value, &["foo", "bar", "deeper"]), None);
        assert_eq!(deep_get(&value, &[]), Some(&value));
    }

    #[test]
    fn test_deep_get_ignore_case() {
        let value = json!({"Headers": {"ORIGIN": "x"}});
        assert_eq!(
            deep_get_ignore_case(&value, &["headers", "origin"]),
            Some(&json!("x"))
        );
    }

    #[test]
    fn test_select_keys() {
        let map = json!({"a": 1, "b": 2, "c": 3});
        let map = map.as_object().unwrap();
        let selected = select_keys(map, ["a", "unknown_key"]);
        assert_eq!(Value::Object(selected), json!({"a": 1}));
        assert!(select_keys(map, std::iter::empty()).is_empty());
    }

    #[test]
    fn test_http_accessors() {
        let event = Event::new(json!({
            "headers": {"Content-Type": "application/json"},
            "queryStringParameters": {"a": "1"},
            "pathParameters": null,
            "body": "{}",
            "requestContext": {"authorizer": {"domain": "test.com", "sub": null}}
        }));

        assert_eq!(event.header("content-type"), Some("application/json"));
        assert_eq!(event.query_parameters().unwrap().len(), 1);
        assert!(event.path_parameters().is_none());
        assert_eq!(event.body(), Some("{}"));
        assert!(!event.is_base64_encoded());
        assert_eq!(event.authorizer_claim("domain"), Some(&json!("test.com")));
        assert_eq!(event.authorizer_claim("sub"), None);
    }

    #[test]
    fn test_first_sns_record() {
        let event = Event::new(json!({
            "Records": [{"Sns": {
                "TopicArn": "arn:aws:sns:region:account:ns-topic",
                "Message": "{\"foo\": \"bar\"}"
            }}]
        }));

        let record = event.first_sns_record().unwrap();
        assert_eq!(record.topic_name(), "ns-topic");
        assert_eq!(record.message, &json!("{\"foo\": \"bar\"}"));

        assert!(Event::new(json!({"message": {}})).first_sns_record().is_none());
        assert!(Event::new(json!({"Records": []})).first_sns_record().is_none());
    }
}
