//! Extractors for values injected by the decorator layers.
//!
//! Each extractor reads one named entry of the context's extras map. If the
//! matching decorator is missing from the chain, extraction fails with
//! [`ExtractError::Missing`]; wrap the parameter in `Option` to make it
//! optional.

use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use cirrus_core::{ExtractError, ExtractResult};

use crate::context::{HandlerContext, keys};
use crate::extractor::FromContext;
use crate::layers::configuration::ConfigurationAccessor;

fn required_extra(ctx: &HandlerContext, name: &str) -> ExtractResult<Value> {
    ctx.get_extra(name)
        .ok_or_else(|| ExtractError::missing(name))
}

fn deserialize_extra<T: DeserializeOwned>(ctx: &HandlerContext, name: &str) -> ExtractResult<T> {
    serde_json::from_value(required_extra(ctx, name)?).map_err(|source| {
        ExtractError::Deserialize {
            name: name.to_string(),
            source,
        }
    })
}

// ============================================================================
// Extras
// ============================================================================

/// A snapshot of every value injected so far.
///
/// Useful for decorators that inject under caller-chosen names, such as
/// `environ_aware` and `parameters`.
///
/// ```rust,ignore
/// async fn handler(extras: Extras) -> Value {
///     json!({ "page": extras.get_str("page") })
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras(pub Map<String, Value>);

impl Extras {
    /// Returns the value of `name` as a string slice, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name)?.as_str()
    }

    /// Deserializes the value of `name`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> ExtractResult<T> {
        let value = self
            .0
            .get(name)
            .cloned()
            .ok_or_else(|| ExtractError::missing(name))?;
        serde_json::from_value(value).map_err(|source| ExtractError::Deserialize {
            name: name.to_string(),
            source,
        })
    }

    /// Consumes the snapshot, returning the underlying map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Extras {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for Extras {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        Ok(Self(ctx.extras()))
    }
}

// ============================================================================
// String-valued injections
// ============================================================================

macro_rules! string_extractor {
    ($(#[$meta:meta])* $name:ident => $key:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl FromContext for $name {
            fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
                deserialize_extra(ctx, $key).map(Self)
            }
        }
    };
}

string_extractor! {
    /// The deployment namespace, injected by `namespace_aware`.
    Namespace => keys::NAMESPACE
}

string_extractor! {
    /// The authorizer's domain claim, injected by `domain_aware`.
    Domain => keys::DOMAIN
}

string_extractor! {
    /// The authorizer's subject claim, injected by `sub_aware`.
    Subject => keys::SUB
}

string_extractor! {
    /// The allowed request origin, injected by `allow_origin_response`.
    RequestOrigin => keys::REQUEST_ORIGIN
}

string_extractor! {
    /// The topic a pub/sub message arrived on, injected by `subscriber`.
    TopicArn => keys::TOPIC_ARN
}

// ============================================================================
// Structured injections
// ============================================================================

/// The parsed request body, injected by the `body` decorator.
///
/// `T` may be [`Value`] or any deserializable type.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<T = Value>(pub T);

impl<T> Deref for Body<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromContext for Body<T> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        deserialize_extra(ctx, keys::BODY).map(Self)
    }
}

/// The decoded pub/sub message, injected by the `subscriber` decorator.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T = Value>(pub T);

impl<T> Deref for Message<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromContext for Message<T> {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        deserialize_extra(ctx, keys::MESSAGE).map(Self)
    }
}

/// Lazy access to the configuration store, injected by `configuration_aware`.
///
/// ```rust,ignore
/// async fn handler(configuration: Configuration) -> Result<Value, InvocationError> {
///     let settings = configuration.load().await.map_err(InvocationError::other)?;
///     Ok(json!({ "keys": settings.keys().collect::<Vec<_>>() }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Configuration(pub ConfigurationAccessor);

impl Deref for Configuration {
    type Target = ConfigurationAccessor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromContext for Configuration {
    fn from_context(ctx: &Arc<HandlerContext>) -> ExtractResult<Self> {
        ctx.get_state::<ConfigurationAccessor>()
            .map(Self)
            .ok_or_else(|| ExtractError::missing("configuration"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::{Event, InvocationContext, Resources};
    use serde::Deserialize;
    use serde_json::json;

    fn context() -> Arc<HandlerContext> {
        Arc::new(HandlerContext::new(
            Event::default(),
            InvocationContext::default(),
            Arc::new(Resources::default()),
        ))
    }

    #[test]
    fn test_string_extractors() {
        let ctx = context();
        ctx.insert_extra(keys::DOMAIN, "test.com");

        assert_eq!(Domain::from_context(&ctx).unwrap().as_str(), "test.com");
        assert!(matches!(
            Subject::from_context(&ctx),
            Err(ExtractError::Missing(name)) if name == "sub"
        ));
        assert_eq!(Option::<Subject>::from_context(&ctx).unwrap(), None);
    }

    #[test]
    fn test_wrong_shape() {
        let ctx = context();
        ctx.insert_extra(keys::NAMESPACE, 5);
        assert!(matches!(
            Namespace::from_context(&ctx),
            Err(ExtractError::Deserialize { .. })
        ));
    }

    #[test]
    fn test_typed_body() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            a: i64,
            b: Option<String>,
        }

        let ctx = context();
        ctx.insert_extra(keys::BODY, json!({"a": 1, "b": null}));

        let Body(item) = Body::<Item>::from_context(&ctx).unwrap();
        assert_eq!(item, Item { a: 1, b: None });
    }

    #[test]
    fn test_extras_snapshot() {
        let ctx = context();
        ctx.insert_extra("page", "2");
        ctx.insert_extra("limit", 10);

        let extras = Extras::from_context(&ctx).unwrap();
        assert_eq!(extras.get_str("page"), Some("2"));
        assert_eq!(extras.get_as::<u32>("limit").unwrap(), 10);
        assert!(extras.get_as::<u32>("missing").is_err());
    }

    #[test]
    fn test_configuration_requires_decorator() {
        let ctx = context();
        assert!(Configuration::from_context(&ctx).is_err());
    }
}
