//! # Cirrus
//!
//! A decorator pipeline framework for serverless HTTP and event handlers.
//!
//! ## Overview
//!
//! A Cirrus function is a plain async handler wrapped in a stack of
//! decorators. Each decorator reads the inbound event or the environment,
//! injects named values for the handler, and may short-circuit with a
//! structured error. The response normalizer turns whatever comes out into
//! the `{statusCode, body, headers}` envelope expected by the gateway.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────────────────────────────────────┐     ┌─────────┐
//! │  Function   │────▶│ http_response ▶ cors ▶ claims ▶ body ...  │────▶│ Handler │
//! │  (runtime)  │◀────│         (decorators, outermost first)     │◀────│ (Reply) │
//! └─────────────┘     └───────────────────────────────────────────┘     └─────────┘
//! ```
//!
//! - **Runtime**: Loads configuration, sets up logging, runs invocations
//! - **Decorators**: Tower layers that inject values or reject the request
//! - **Handlers**: User-defined async functions (Axum-style)
//! - **Resources**: Shared collaborators such as the blob store
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cirrus::prelude::*;
//! use serde_json::{Value, json};
//!
//! async fn create_item(domain: Domain, Body(item): Body<Value>) -> Value {
//!     json!({ "domain": domain.as_str(), "item": item })
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     init()?;
//!
//!     let function = Function::new(
//!         ServiceBuilder::new()
//!             .layer(http_response())
//!             .layer(allow_origin_response(r".*\.example\.com")?)
//!             .layer(domain_aware())
//!             .layer(body(&["name"], &[]))
//!             .handler(create_item),
//!     );
//!
//!     let response = function.respond(event, context).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: Read `cirrus.toml` (default)
//! - `yaml-config`: Read `cirrus.yaml`
//! - `json-log`: Enable the JSON log format

pub use cirrus_core as core;
pub use cirrus_framework as framework;
pub use cirrus_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use cirrus::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use cirrus_runtime::{Function, init};

    // Decorators, extractors and the handler builder
    pub use cirrus_framework::prelude::*;

    // Core types for handlers
    pub use cirrus_core::{
        Event, HttpError, HttpResponse, InvocationContext, InvocationError, InvocationResult,
        Json, Reply, Resources,
    };
}
