//! Error types for the handler pipeline.
//!
//! Every failure inside a pipeline travels through a single channel,
//! [`InvocationError`]. User-visible failures carry a status code and a body
//! through the [`StatusError`] capability; [`HttpError`] is the stock
//! implementation, but any error type exposing the same two fields is handled
//! identically by the response normalizer.
//!
//! | Kind | Status | Raised by |
//! |---|---|---|
//! | validation | 400 | malformed parameters or body |
//! | authorization context | 500 | a claim or environment value the chain depends on is missing |
//! | forbidden | 403 | origin or scope denial |
//! | unhandled | 500 | anything else; the message is redacted |

use serde_json::Value;
use thiserror::Error;

/// Boxed error used for opaque failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// StatusError
// =============================================================================

/// An error that maps onto a response status code and body.
pub trait StatusError: std::error::Error + Send + Sync + 'static {
    /// The HTTP-like status code to respond with.
    fn status_code(&self) -> u16;

    /// The response body payload.
    fn body(&self) -> Value;
}

/// The stock structured error: a status code plus a JSON body.
///
/// # Example
///
/// ```rust,ignore
/// async fn get_item(params: Extras) -> Result<Value, InvocationError> {
///     let id = params.get_str("id").ok_or_else(|| HttpError::bad_request("Invalid id"))?;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
#[error("HTTP {status_code}: {body}")]
pub struct HttpError {
    status_code: u16,
    body: Value,
}

impl HttpError {
    /// Creates an error with an arbitrary status and body.
    pub fn new(status_code: u16, body: impl Into<Value>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// 400: the request is malformed or incomplete.
    pub fn bad_request(body: impl Into<Value>) -> Self {
        Self::new(400, body)
    }

    /// 403: the caller is not allowed to make this request.
    pub fn forbidden(body: impl Into<Value>) -> Self {
        Self::new(403, body)
    }

    /// 500: the function or its upstream configuration is broken.
    pub fn internal(body: impl Into<Value>) -> Self {
        Self::new(500, body)
    }

    /// The status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The body payload.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The body as text: strings verbatim, anything else as JSON.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl StatusError for HttpError {
    fn status_code(&self) -> u16 {
        self.status_code
    }

    fn body(&self) -> Value {
        self.body.clone()
    }
}

// =============================================================================
// Extraction and skip errors
// =============================================================================

/// Errors that occur while resolving handler arguments from the context.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No layer injected the named argument.
    #[error("handler argument '{0}' was not injected")]
    Missing(String),

    /// The injected value could not be converted to the requested type.
    #[error("handler argument '{name}' has the wrong shape: {source}")]
    Deserialize {
        /// The argument name.
        name: String,
        /// The underlying conversion error.
        source: serde_json::Error,
    },

    /// Custom extraction error.
    #[error("{0}")]
    Custom(String),
}

impl ExtractError {
    /// Creates a missing-argument error.
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing(name.into())
    }

    /// Creates a custom extraction error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Returned by a layer that declines an event without treating it as a failure.
///
/// Runtimes recognise this error and finish the invocation quietly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event skipped: {reason}")]
pub struct EventSkipped {
    reason: String,
}

impl EventSkipped {
    /// Creates a skip marker with a reason for the logs.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the event was skipped.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

// =============================================================================
// InvocationError
// =============================================================================

/// The single error channel of a handler pipeline.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// A user-facing failure with a status code and body.
    #[error("{0}")]
    Status(Box<dyn StatusError>),

    /// A handler argument could not be resolved.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// A layer declined the event.
    #[error(transparent)]
    Skipped(#[from] EventSkipped),

    /// Any other failure.
    #[error("{0}")]
    Other(BoxError),
}

impl InvocationError {
    /// Wraps any [`StatusError`] implementation.
    pub fn status<E: StatusError>(err: E) -> Self {
        Self::Status(Box::new(err))
    }

    /// Wraps an opaque error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Returns the status code and body if this error is user-facing.
    ///
    /// An [`HttpError`] hidden inside [`InvocationError::Other`] is found by
    /// downcasting, so errors that were boxed along the way keep their status.
    pub fn status_parts(&self) -> Option<(u16, Value)> {
        match self {
            Self::Status(err) => Some((err.status_code(), err.body())),
            Self::Other(err) => err
                .downcast_ref::<HttpError>()
                .map(|err| (err.status_code, err.body.clone())),
            Self::Extract(_) | Self::Skipped(_) => None,
        }
    }

    /// Whether a layer declined the event.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl From<HttpError> for InvocationError {
    fn from(err: HttpError) -> Self {
        Self::status(err)
    }
}

impl From<BoxError> for InvocationError {
    fn from(err: BoxError) -> Self {
        Self::Other(err)
    }
}

impl From<serde_json::Error> for InvocationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

/// Result type for pipeline operations.
pub type InvocationResult<T> = Result<T, InvocationError>;
