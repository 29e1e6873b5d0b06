//! Environment lookups.
//!
//! Layers never read process state directly. They ask the [`Environment`]
//! carried by the shared resources, once per invocation, so a value changed
//! between two calls is picked up by the second one.

use std::collections::HashMap;
use std::fmt;

/// Name of the variable holding the deployment namespace.
pub const NAMESPACE: &str = "NAMESPACE";
/// Name of the variable holding the configuration bucket.
pub const CONFIG_BUCKET: &str = "CONFIG";
/// Name of the variable holding the encryption key identifier.
pub const ENCRYPT_KEY_ARN: &str = "ENCRYPT_KEY_ARN";

/// Source of named environment values.
pub trait Environment: fmt::Debug + Send + Sync + 'static {
    /// Returns the value of `name`, or `None` when it is not set.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed set of values, for tests and local runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
