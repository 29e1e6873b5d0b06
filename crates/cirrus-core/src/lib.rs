//! # Cirrus Core
//!
//! The core types of the Cirrus serverless handler framework.
//!
//! This crate provides everything the decorator pipeline passes around,
//! without knowing anything about the pipeline itself.
//!
//! ## Architecture Layers
//!
//! Cirrus Core is organized into two architectural layers:
//!
//! ### Foundation Layer
//!
//! Core abstractions and type system:
//! - **Event Model**: The raw inbound document and its typed accessors ([`Event`])
//! - **Invocation Metadata**: Request id and function ARN ([`InvocationContext`])
//! - **Error Channel**: Structured errors and the pipeline error ([`HttpError`], [`InvocationError`])
//! - **Replies**: Handler outcomes and the wire envelope ([`Reply`], [`HttpResponse`])
//! - **Environment**: Per-invocation value lookups ([`Environment`])
//!
//! ### Integration Layer
//!
//! External system interfaces:
//! - **Collaborators**: Object storage, key management, compute ([`BlobStore`], [`KeyService`], [`FunctionInvoker`])
//! - **Resources**: The shared, immutable resource set ([`Resources`])
//! - **Configuration Store**: Encrypted settings documents ([`configuration`])
//!
//! ## Request Flow
//!
//! ```text
//! ┌─────────┐     ┌───────────────┐     ┌─────────┐     ┌──────────────┐
//! │  Event  │────▶│  Decorators   │────▶│ Handler │────▶│ HttpResponse │
//! │ Context │     │ (framework)   │◀────│ (Reply) │     │  (envelope)  │
//! └─────────┘     └───────────────┘     └─────────┘     └──────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use cirrus_core::{Event, HttpError, InvocationError, Reply};
//! use serde_json::json;
//!
//! fn check(event: &Event) -> Result<Reply, InvocationError> {
//!     let origin = event
//!         .header("origin")
//!         .ok_or_else(|| HttpError::forbidden("Origin not allowed"))?;
//!     Ok(Reply::new(json!({ "origin": origin })))
//! }
//! ```

// Architectural layers
pub mod foundation;
pub mod integration;

pub use integration::configuration;

// Re-export foundation types
pub use foundation::{
    BoxError, Environment, Event, EventSkipped, ExtractError, ExtractResult, HttpError,
    HttpResponse, IntoReply, InvalidStatusCode, InvocationContext, InvocationError,
    InvocationResult, Json, MapEnvironment, ProcessEnvironment, Reply, SnsRecord, StatusError,
    deep_get, deep_get_ignore_case, select_keys,
};

// Re-export integration types
pub use integration::{
    BlobStore, ClientError, ClientResult, ConfigurationDocument, ConfigurationError,
    ConfigurationResult, Connection, FunctionInvoker, InvocationMode, KeyService,
    MemoryBlobStore, Resources, ResourcesBuilder, Setting, Settings, sanitize_passwords,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::integration::{
        BlobStore, FunctionInvoker, InvocationMode, KeyService, MemoryBlobStore, Resources,
    };
}
