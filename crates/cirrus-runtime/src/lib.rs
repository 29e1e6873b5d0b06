//! Cirrus Runtime - Process-level support for Cirrus functions.
//!
//! This crate provides:
//! - The function entry point (`Function`, `init`)
//! - Runtime configuration loading (`ConfigLoader`)
//! - Logging configuration (`LoggingBuilder`)
//! - Helpers for stream records, sibling function calls and item updates
//!
//! # Quick Start
//!
//! ```ignore
//! use cirrus_framework::prelude::*;
//! use cirrus_runtime::{Function, init};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Loads `cirrus.toml` and `CIRRUS_*` variables, then sets up logging
//!     init()?;
//!
//!     let function = Function::new(
//!         ServiceBuilder::new()
//!             .layer(http_response())
//!             .layer(namespace_aware())
//!             .handler(|ns: Namespace| async move { format!("hello from {}", ns.as_str()) }),
//!     );
//!
//!     let response = function.respond(event, context).await;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Settings are merged from defaults, an optional `cirrus.{toml,yaml,json}`
//! file and `CIRRUS_`-prefixed environment variables, in that order:
//!
//! ```text
//! CIRRUS_LOGGING__LEVEL=debug
//! CIRRUS_LOGGING__FORMAT=json
//! ```

pub mod config;
pub mod error;
pub mod function;
pub mod invoke;
pub mod logging;
pub mod records;
pub mod update;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LoggingConfig, RuntimeConfig};
pub use error::{
    InvokeError, InvokeResult, RecordError, RecordResult, RuntimeError, RuntimeResult,
};
pub use function::{Function, init, init_with};
pub use invoke::{function_name, invoke_function};
pub use logging::{LoggingBuilder, SpanEvents};
pub use records::{decode_record, decode_records};
pub use update::UpdateExpression;

// Re-export tracing for use by function crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
