//! Query string and path parameter validation.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::warn;

use cirrus_core::{HttpError, InvocationResult};

use crate::context::HandlerContext;
use crate::decorator::{Decorator, DecoratorLayer};

/// Validates and injects request parameters.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    required_querystring: Arc<[String]>,
    optional_querystring: Arc<[String]>,
    required_path: Arc<[String]>,
    optional_path: Arc<[String]>,
}

/// Resolves `required` and `optional` names against one parameter source.
///
/// Returns the names of missing required parameters as the error.
fn resolve(
    source: Option<&Map<String, Value>>,
    required: &[String],
    optional: &[String],
) -> Result<Vec<(String, Value)>, Vec<String>> {
    let lookup = |name: &String| source.and_then(|params| params.get(name)).filter(|v| !v.is_null());

    let missing: Vec<String> = required
        .iter()
        .filter(|name| lookup(*name).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(required
        .iter()
        .chain(optional.iter())
        .map(|name| (name.clone(), lookup(name).cloned().unwrap_or(Value::Null)))
        .collect())
}

impl Decorator for Parameters {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let event = ctx.event();

        let query = resolve(
            event.query_parameters(),
            &self.required_querystring,
            &self.optional_querystring,
        )
        .map_err(|missing| {
            warn!(?missing, "Missing query string parameters");
            HttpError::bad_request(format!(
                "Invalid querystring parameters: {}",
                missing.join(", ")
            ))
        })?;

        let path = resolve(
            event.path_parameters(),
            &self.required_path,
            &self.optional_path,
        )
        .map_err(|missing| {
            warn!(?missing, "Missing path parameters");
            HttpError::bad_request(format!("Invalid path parameters: {}", missing.join(", ")))
        })?;

        for (name, value) in query.into_iter().chain(path) {
            ctx.insert_extra(name, value);
        }
        Ok(())
    }
}

/// Layer type returned by [`parameters`].
pub type ParametersLayer = DecoratorLayer<Parameters>;

/// Starts a parameter validation layer with no parameters declared.
///
/// Every declared parameter is injected under its own name; a missing
/// optional parameter is injected as `null`. A missing required parameter
/// fails with 400 and the body lists the invalid names.
///
/// ```rust,ignore
/// ServiceBuilder::new()
///     .layer(
///         parameters()
///             .required_querystring(["page"])
///             .optional_querystring(["limit"])
///             .path(["id"]),
///     )
///     .handler(list_items);
/// ```
pub fn parameters() -> ParametersLayer {
    DecoratorLayer::new(Parameters::default())
}

fn names<I, N>(names: I) -> Arc<[String]>
where
    I: IntoIterator<Item = N>,
    N: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl ParametersLayer {
    /// Query string parameters that must be present.
    pub fn required_querystring<I, N>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.decorator.required_querystring = names(required);
        self
    }

    /// Query string parameters that may be absent.
    pub fn optional_querystring<I, N>(mut self, optional: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.decorator.optional_querystring = names(optional);
        self
    }

    /// Path parameters that must be present.
    pub fn path<I, N>(mut self, required: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.decorator.required_path = names(required);
        self
    }

    /// Path parameters that may be absent.
    pub fn optional_path<I, N>(mut self, optional: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.decorator.optional_path = names(optional);
        self
    }
}
