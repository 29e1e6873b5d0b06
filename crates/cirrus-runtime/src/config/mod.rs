//! Runtime configuration.
//!
//! Only process-wide settings live here. Per-invocation values such as
//! `NAMESPACE` or `CONFIG` are read through the `Environment` on every call.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CONFIG_FILE_STEM, ConfigLoader, ENV_PREFIX, load_config};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, RuntimeConfig, SpanEventConfig};
