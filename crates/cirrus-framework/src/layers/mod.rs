//! The built-in decorator library.
//!
//! Every constructor returns a tower [`Layer`](tower::Layer). Layers are
//! independent of each other: each one re-derives what it needs from the raw
//! event and either injects named values into the context or fails the call
//! before the wrapped service runs.
//!
//! | Constructor | Injects | Fails with |
//! |---|---|---|
//! | [`environ_aware`] | each named environment value | 500 |
//! | [`namespace_aware`] | `NAMESPACE` | 500 |
//! | [`domain_aware`] | `domain` | 500 |
//! | [`sub_aware`] | `sub` | 500 |
//! | [`scopes`] | nothing | 500 / 403 |
//! | [`allow_origin_response`] | `request_origin` | 403 |
//! | [`parameters`] | each named parameter | 400 |
//! | [`body`] | `body` | 400 |
//! | [`subscriber`] | `topic_arn`, `message` | plain error / skip |
//! | [`configuration_aware`] | a [`ConfigurationAccessor`] | never |
//! | [`catch_errors`] | nothing | never |

pub mod body;
pub mod catch;
pub mod claims;
pub mod configuration;
pub mod cors;
pub mod environ;
pub mod parameters;
pub mod subscriber;

pub use body::{JsonBody, JsonBodyLayer, body};
pub use catch::{CatchErrors, CatchErrorsLayer, catch_errors};
pub use claims::{ClaimAware, ClaimAwareLayer, Scopes, ScopesLayer, domain_aware, scopes, sub_aware};
pub use configuration::{
    ConfigurationAccessor, ConfigurationAware, ConfigurationAwareLayer, configuration_aware,
};
pub use cors::{
    ALLOW_CREDENTIALS_HEADER, ALLOW_ORIGIN_HEADER, AllowOrigin, AllowOriginLayer,
    allow_origin_response,
};
pub use environ::{
    EnvironAware, EnvironAwareLayer, NamespaceAware, NamespaceAwareLayer, environ_aware,
    namespace_aware,
};
pub use parameters::{Parameters, ParametersLayer, parameters};
pub use subscriber::{Subscriber, SubscriberError, SubscriberLayer, subscriber};
