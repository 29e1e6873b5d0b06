//! Environment-backed decorators.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use cirrus_core::{HttpError, InvocationResult};

use crate::context::{HandlerContext, keys};
use crate::decorator::{Decorator, DecoratorLayer};

/// Injects named environment values.
#[derive(Debug, Clone)]
pub struct EnvironAware {
    required: Arc<[String]>,
    optional: Arc<[String]>,
}

impl Decorator for EnvironAware {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let mut values = Vec::with_capacity(self.required.len() + self.optional.len());
        for name in self.required.iter() {
            let Some(value) = ctx.env_var(name) else {
                warn!(name = %name, "Required environment value is not set");
                return Err(HttpError::internal(format!("{name} environment variable missing")).into());
            };
            values.push((name, Value::String(value)));
        }
        for name in self.optional.iter() {
            values.push((name, ctx.env_var(name).map_or(Value::Null, Value::String)));
        }

        for (name, value) in values {
            ctx.insert_extra(name.as_str(), value);
        }
        Ok(())
    }
}

/// Layer type returned by [`environ_aware`].
pub type EnvironAwareLayer = DecoratorLayer<EnvironAware>;

/// Injects each `required` and `optional` environment value under its own name.
///
/// A missing required value fails with 500; a missing optional value is
/// injected as `null`. Nothing is injected unless every required value is set.
///
/// ```rust,ignore
/// ServiceBuilder::new()
///     .layer(environ_aware(&["TABLE"], &["DEBUG"]))
///     .handler(|extras: Extras| async move { extras.get_str("TABLE").map(str::to_string) });
/// ```
pub fn environ_aware(required: &[&str], optional: &[&str]) -> EnvironAwareLayer {
    DecoratorLayer::new(EnvironAware {
        required: required.iter().map(|name| name.to_string()).collect(),
        optional: optional.iter().map(|name| name.to_string()).collect(),
    })
}

/// Injects the deployment namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamespaceAware;

impl Decorator for NamespaceAware {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let namespace = ctx.env_var(keys::NAMESPACE).ok_or_else(|| {
            warn!("NAMESPACE is not set");
            HttpError::internal("NAMESPACE environment variable missing")
        })?;
        ctx.insert_extra(keys::NAMESPACE, namespace);
        Ok(())
    }
}

/// Layer type returned by [`namespace_aware`].
pub type NamespaceAwareLayer = DecoratorLayer<NamespaceAware>;

/// Injects the `NAMESPACE` environment value; fails with 500 when unset.
pub fn namespace_aware() -> NamespaceAwareLayer {
    DecoratorLayer::new(NamespaceAware)
}
