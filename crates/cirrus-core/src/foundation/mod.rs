//! Foundation layer - Core abstractions and type system.
//!
//! This module contains the fundamental building blocks of the Cirrus framework:
//! - The inbound event model and invocation metadata
//! - The single error channel of the handler pipeline
//! - Handler replies and the wire response envelope
//! - Environment lookups

pub mod context;
pub mod env;
pub mod error;
pub mod event;
pub mod reply;

pub use context::InvocationContext;
pub use env::{Environment, MapEnvironment, ProcessEnvironment};
pub use error::{
    BoxError, EventSkipped, ExtractError, ExtractResult, HttpError, InvocationError,
    InvocationResult, StatusError,
};
pub use event::{Event, SnsRecord, deep_get, deep_get_ignore_case, select_keys};
pub use reply::{HttpResponse, IntoReply, InvalidStatusCode, Json, Reply};
