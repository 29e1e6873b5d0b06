//! Collaborator interfaces.
//!
//! The framework talks to object storage, key management and compute through
//! these traits. Implementations own their own timeouts and retries; the
//! framework only sees the final outcome.

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by collaborator implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The addressed resource does not exist.
    #[error("resource '{resource}' not found")]
    NotFound {
        /// Identifier of the missing resource.
        resource: String,
    },

    /// The request failed for any other reason.
    #[error("request failed: {0}")]
    Request(String),
}

impl ClientError {
    /// Creates a not-found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a generic request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for collaborator calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Object storage addressed by bucket and key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetches the whole object.
    async fn get(&self, bucket: &str, key: &str) -> ClientResult<Vec<u8>>;

    /// Writes the whole object, replacing any previous content.
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> ClientResult<()>;
}

/// Symmetric key management.
#[async_trait]
pub trait KeyService: Send + Sync {
    /// Encrypts `plaintext` under `key_id`.
    ///
    /// A provider may return `None` when it produced no ciphertext.
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> ClientResult<Option<Vec<u8>>>;

    /// Decrypts a ciphertext blob. The key is identified by the blob itself.
    async fn decrypt(&self, ciphertext: &[u8]) -> ClientResult<Vec<u8>>;
}

/// How a function is invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvocationMode {
    /// Wait for the function's result.
    #[default]
    RequestResponse,
    /// Fire and forget; the response only reports delivery.
    Event,
}

impl InvocationMode {
    /// The invocation type name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestResponse => "RequestResponse",
            Self::Event => "Event",
        }
    }
}

/// Invokes other functions by name.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invokes `function_name` with `payload`.
    ///
    /// Implementations report a missing function as [`ClientError::NotFound`].
    async fn invoke(
        &self,
        function_name: &str,
        payload: Vec<u8>,
        mode: InvocationMode,
    ) -> ClientResult<Vec<u8>>;
}
