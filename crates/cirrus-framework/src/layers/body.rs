//! JSON request body parsing.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use cirrus_core::{HttpError, InvocationResult};

use crate::context::{HandlerContext, keys};
use crate::decorator::{Decorator, DecoratorLayer};

/// Parses the request body and checks its top-level keys.
#[derive(Debug, Clone)]
pub struct JsonBody {
    required: Arc<[String]>,
    optional: Arc<[String]>,
}

impl JsonBody {
    fn parse(ctx: &HandlerContext) -> Result<Value, HttpError> {
        let event = ctx.event();
        let raw = event.body().unwrap_or_default();
        let bytes = if event.is_base64_encoded() {
            STANDARD.decode(raw).map_err(|err| {
                debug!(error = %err, "Request body is not valid base64");
                HttpError::bad_request("cannot decode json")
            })?
        } else {
            raw.as_bytes().to_vec()
        };

        serde_json::from_slice(&bytes).map_err(|err| {
            debug!(error = %err, "Request body is not valid JSON");
            HttpError::bad_request("cannot decode json")
        })
    }
}

impl Decorator for JsonBody {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let body = Self::parse(ctx)?;

        if self.required.is_empty() && self.optional.is_empty() {
            ctx.insert_extra(keys::BODY, body);
            return Ok(());
        }

        let Some(fields) = body.as_object() else {
            warn!("Request body is not a JSON object");
            return Err(HttpError::bad_request("cannot decode json").into());
        };
        let field = |key: &str| fields.get(key);

        if let Some(key) = self.required.iter().find(|key| field(key).is_none()) {
            warn!(key = %key, "Request body is missing a required key");
            return Err(HttpError::bad_request(format!("missing required key: {key}")).into());
        }

        let projected: Map<String, Value> = self
            .required
            .iter()
            .chain(self.optional.iter())
            .map(|key| (key.clone(), field(key).cloned().unwrap_or(Value::Null)))
            .collect();
        ctx.insert_extra(keys::BODY, projected);
        Ok(())
    }
}

/// Layer type returned by [`body`].
pub type JsonBodyLayer = DecoratorLayer<JsonBody>;

/// Parses the body as JSON and injects it as `body`.
///
/// The body is base64-decoded first when the event sets `isBase64Encoded`.
/// When keys are declared, the injected object holds exactly the `required`
/// and `optional` keys, with missing optional keys set to `null`; with no
/// keys declared the whole document is injected.
///
/// Fails with 400 "cannot decode json" on a malformed body, or on a body
/// that is not an object when keys are declared, and with 400
/// "missing required key: X" when a required key is absent.
pub fn body(required: &[&str], optional: &[&str]) -> JsonBodyLayer {
    DecoratorLayer::new(JsonBody {
        required: required.iter().map(|key| key.to_string()).collect(),
        optional: optional.iter().map(|key| key.to_string()).collect(),
    })
}
