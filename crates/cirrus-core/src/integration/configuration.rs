//! Namespaced settings stored as a single JSON document in a blob store.
//!
//! The stored document looks like:
//!
//! ```json
//! {
//!   "settings": {
//!     "db_host": { "value": "db.internal", "encrypted": false },
//!     "db_password": { "value": "<base64 ciphertext>", "encrypted": true }
//!   },
//!   "last_updated": "2024-05-01T12:00:00Z"
//! }
//! ```
//!
//! Entries flagged `encrypted` are decrypted on [`load`] and encrypted on
//! [`save`]; all other entries pass through unchanged. Nothing is cached, so
//! concurrent writers follow last-write-wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error};

use super::client::{BlobStore, ClientError, KeyService};

/// Placeholder shown instead of secret values.
pub const MASK: &str = "********";

// =============================================================================
// Types
// =============================================================================

/// One configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    /// The value; base64 ciphertext at rest when `encrypted` is set.
    pub value: String,
    /// Whether the value is stored encrypted.
    #[serde(default)]
    pub encrypted: bool,
}

impl Setting {
    /// A value stored as-is.
    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            encrypted: false,
        }
    }

    /// A value stored encrypted.
    pub fn secret(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            encrypted: true,
        }
    }
}

/// Settings by name.
pub type Settings = BTreeMap<String, Setting>;

/// The persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    /// All entries, in their stored form.
    #[serde(default)]
    pub settings: Settings,
    /// When the document was last written, as an RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// Clients and key used by the configuration store.
#[derive(Clone)]
pub struct Connection {
    blob_store: Arc<dyn BlobStore>,
    key_service: Option<Arc<dyn KeyService>>,
    encrypt_key_id: Option<String>,
}

impl Connection {
    /// Creates a connection that can read and write plain settings.
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            blob_store,
            key_service: None,
            encrypt_key_id: None,
        }
    }

    /// Adds the key service used for encrypted entries.
    pub fn with_key_service(mut self, key_service: Arc<dyn KeyService>) -> Self {
        self.key_service = Some(key_service);
        self
    }

    /// Sets the key new ciphertexts are produced under.
    pub fn with_encrypt_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.encrypt_key_id = Some(key_id.into());
        self
    }

    /// The key new ciphertexts are produced under.
    pub fn encrypt_key_id(&self) -> Option<&str> {
        self.encrypt_key_id.as_deref()
    }

    fn key_service(&self) -> ConfigurationResult<&Arc<dyn KeyService>> {
        self.key_service
            .as_ref()
            .ok_or(ConfigurationError::MissingKeyService)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("key_service", &self.key_service.is_some())
            .field("encrypt_key_id", &self.encrypt_key_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised by the configuration store.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The stored document is not valid JSON of the expected shape.
    #[error("invalid configuration document: {0}")]
    Document(#[from] serde_json::Error),

    /// A ciphertext is not valid base64.
    #[error("invalid ciphertext encoding: {0}")]
    Ciphertext(#[from] base64::DecodeError),

    /// A decrypted value is not valid UTF-8.
    #[error("decrypted value is not UTF-8: {0}")]
    Plaintext(#[from] std::string::FromUtf8Error),

    /// A collaborator call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An encrypted entry was found but no key service is configured.
    #[error("no key service configured for encrypted settings")]
    MissingKeyService,

    /// Encryption was requested without a key id.
    #[error("no encryption key id configured")]
    MissingKeyId,

    /// No bucket is configured for the store.
    #[error("CONFIG environment variable missing")]
    MissingBucket,

    /// No blob store is available to the invocation.
    #[error("no blob store configured")]
    MissingBlobStore,

    /// The update timestamp could not be rendered.
    #[error("cannot format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Result type for configuration store operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

// =============================================================================
// Operations
// =============================================================================

/// Loads the settings stored at `bucket`/`file`, decrypting secret entries.
///
/// A failure to fetch the document is logged and yields empty settings; a
/// malformed document or a failed decryption is returned as an error.
pub async fn load(conn: &Connection, bucket: &str, file: &str) -> ConfigurationResult<Settings> {
    let content = match conn.blob_store.get(bucket, file).await {
        Ok(content) => content,
        Err(err) => {
            error!(bucket, file, error = %err, "Could not load configuration");
            return Ok(Settings::new());
        }
    };

    let document: ConfigurationDocument = serde_json::from_slice(&content)?;
    let mut settings = document.settings;
    for setting in settings.values_mut().filter(|s| s.encrypted) {
        setting.value = decrypt(conn, &setting.value).await?;
    }

    debug!(bucket, file, settings = ?sanitize_passwords(&settings), "Loaded configuration");
    Ok(settings)
}

/// Encrypts secret entries and writes the whole document to `bucket`/`file`.
///
/// Returns the settings in the form they were persisted.
pub async fn save(
    conn: &Connection,
    bucket: &str,
    file: &str,
    settings: Settings,
) -> ConfigurationResult<Settings> {
    let mut settings = settings;
    for setting in settings.values_mut().filter(|s| s.encrypted) {
        setting.value = encrypt(conn, &setting.value).await?;
    }

    let document = ConfigurationDocument {
        settings,
        last_updated: Some(OffsetDateTime::now_utc().format(&Rfc3339)?),
    };
    let body = serde_json::to_vec(&document)?;
    conn.blob_store.put(bucket, file, body).await?;

    debug!(bucket, file, count = document.settings.len(), "Saved configuration");
    Ok(document.settings)
}

/// Decrypts a base64 ciphertext into text.
pub async fn decrypt(conn: &Connection, ciphertext: &str) -> ConfigurationResult<String> {
    let blob = STANDARD.decode(ciphertext)?;
    let plaintext = conn.key_service()?.decrypt(&blob).await?;
    Ok(String::from_utf8(plaintext)?)
}

/// Encrypts text into a base64 ciphertext.
///
/// When the provider returns no ciphertext, the plaintext is returned as-is.
pub async fn encrypt(conn: &Connection, plaintext: &str) -> ConfigurationResult<String> {
    let key_id = conn
        .encrypt_key_id()
        .ok_or(ConfigurationError::MissingKeyId)?;
    let blob = conn
        .key_service()?
        .encrypt(key_id, plaintext.as_bytes())
        .await?;
    Ok(blob.map_or_else(|| plaintext.to_string(), |blob| STANDARD.encode(blob)))
}

/// Masks the value of every entry whose name contains `password`.
pub fn sanitize_passwords(settings: &Settings) -> Settings {
    settings
        .iter()
        .map(|(name, setting)| {
            let setting = if name.contains("password") {
                Setting {
                    value: MASK.to_string(),
                    ..setting.clone()
                }
            } else {
                setting.clone()
            };
            (name.clone(), setting)
        })
        .collect()
}
