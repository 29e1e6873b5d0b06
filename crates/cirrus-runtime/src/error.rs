//! Runtime error types.

use thiserror::Error;

use cirrus_core::{ClientError, InvocationError};

use crate::config::ConfigError;

/// Errors that can occur while running a function.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Runtime configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The inbound event is not valid JSON.
    #[error("Failed to parse event: {0}")]
    Event(#[from] serde_json::Error),

    /// The handler pipeline failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors raised when invoking another function.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The target function does not exist.
    #[error("Function {name} was called, but does not exist")]
    NotFound {
        /// Fully qualified function name.
        name: String,
    },

    /// The call itself failed.
    #[error("Error calling function {name}: {source}")]
    Invoke {
        /// Fully qualified function name.
        name: String,
        /// The underlying client failure.
        #[source]
        source: ClientError,
    },
}

/// Result type for function invocation.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Errors raised while decoding stream records.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record has no `kinesis.data` string.
    #[error("record has no kinesis.data payload")]
    MissingData,

    /// The payload is not valid base64.
    #[error("invalid record encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The payload could not be decompressed.
    #[error("cannot decompress record: {0}")]
    Decompress(#[from] std::io::Error),

    /// The payload is not UTF-8 text.
    #[error("record is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for record decoding.
pub type RecordResult<T> = Result<T, RecordError>;
