//! Lazy access to the settings store.

use std::sync::Arc;

use tracing::debug;

use cirrus_core::configuration::{self, ConfigurationError, ConfigurationResult, Connection, Settings};
use cirrus_core::foundation::env::{CONFIG_BUCKET, ENCRYPT_KEY_ARN};
use cirrus_core::InvocationResult;

use crate::context::HandlerContext;
use crate::decorator::{Decorator, DecoratorLayer};

/// A settings document bound to the current invocation.
///
/// Building an accessor performs no I/O; every [`load`](Self::load) and
/// [`save`](Self::save) is a full round trip to the blob store.
#[derive(Debug, Clone)]
pub struct ConfigurationAccessor {
    file: Arc<str>,
    bucket: Option<String>,
    connection: Option<Connection>,
}

impl ConfigurationAccessor {
    /// Binds `file` to the bucket, key and clients available to `ctx`.
    pub fn from_context(ctx: &HandlerContext, file: Arc<str>) -> Self {
        let resources = ctx.resources();
        let connection = resources.blob_store().map(|store| {
            let mut connection = Connection::new(store.clone());
            if let Some(keys) = resources.key_service() {
                connection = connection.with_key_service(keys.clone());
            }
            if let Some(key_id) = ctx.env_var(ENCRYPT_KEY_ARN) {
                connection = connection.with_encrypt_key_id(key_id);
            }
            connection
        });

        Self {
            file,
            bucket: ctx.env_var(CONFIG_BUCKET),
            connection,
        }
    }

    /// The document name.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The bucket holding the document, if configured.
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    fn target(&self) -> ConfigurationResult<(&Connection, &str)> {
        let connection = self
            .connection
            .as_ref()
            .ok_or(ConfigurationError::MissingBlobStore)?;
        let bucket = self
            .bucket
            .as_deref()
            .ok_or(ConfigurationError::MissingBucket)?;
        Ok((connection, bucket))
    }

    /// Loads and decrypts the settings.
    pub async fn load(&self) -> ConfigurationResult<Settings> {
        let (connection, bucket) = self.target()?;
        configuration::load(connection, bucket, &self.file).await
    }

    /// Encrypts and stores `settings`, returning them as persisted.
    pub async fn save(&self, settings: Settings) -> ConfigurationResult<Settings> {
        let (connection, bucket) = self.target()?;
        configuration::save(connection, bucket, &self.file, settings).await
    }
}

/// Injects a [`ConfigurationAccessor`] for one document.
#[derive(Debug, Clone)]
pub struct ConfigurationAware {
    file: Arc<str>,
}

impl Decorator for ConfigurationAware {
    type State = ();

    fn before(&self, ctx: &HandlerContext) -> InvocationResult<()> {
        let accessor = ConfigurationAccessor::from_context(ctx, self.file.clone());
        debug!(file = accessor.file(), bucket = accessor.bucket(), "Binding configuration");
        ctx.set_state(accessor);
        Ok(())
    }
}

/// Layer type returned by [`configuration_aware`].
pub type ConfigurationAwareLayer = DecoratorLayer<ConfigurationAware>;

/// Gives the handler lazy access to the settings document `file`.
///
/// The bucket comes from the `CONFIG` environment value and the encryption
/// key from `ENCRYPT_KEY_ARN`. Nothing is fetched until the handler calls
/// [`ConfigurationAccessor::load`], so this layer never fails.
pub fn configuration_aware(file: &str) -> ConfigurationAwareLayer {
    DecoratorLayer::new(ConfigurationAware { file: file.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Configuration;
    use crate::handler::ServiceBuilderExt;
    use cirrus_core::{
        Event, HttpError, InvocationContext, MapEnvironment, MemoryBlobStore, Resources, Setting,
    };
    use serde_json::json;
    use tokio_test::block_on;
    use tower::{ServiceBuilder, ServiceExt};

    fn context(env: MapEnvironment, store: Option<Arc<MemoryBlobStore>>) -> Arc<HandlerContext> {
        let mut resources = Resources::builder().environment(env);
        if let Some(store) = store {
            resources = resources.shared_blob_store(store);
        }
        Arc::new(HandlerContext::new(
            Event::default(),
            InvocationContext::default(),
            Arc::new(resources.build()),
        ))
    }

    #[test]
    fn test_handler_loads_settings() {
        let store = Arc::new(MemoryBlobStore::new());
        store.insert(
            "config-bucket",
            "settings.json",
            r#"{"settings": {"test": {"value": "configuration"}}}"#,
        );
        let env = MapEnvironment::new().with("CONFIG", "config-bucket");

        let svc = ServiceBuilder::new()
            .layer(configuration_aware("settings.json"))
            .handler(|configuration: Configuration| async move {
                let settings = configuration
                    .load()
                    .await
                    .map_err(|err| HttpError::internal(err.to_string()))?;
                Ok::<_, HttpError>(json!(settings["test"].value))
            });

        let reply = block_on(svc.oneshot(context(env, Some(store)))).unwrap();
        assert_eq!(reply.body(), &json!("configuration"));
    }

    #[test]
    fn test_save_then_load() {
        let store = Arc::new(MemoryBlobStore::new());
        let env = MapEnvironment::new().with("CONFIG", "config-bucket");
        let ctx = context(env, Some(store.clone()));

        let accessor = ConfigurationAccessor::from_context(&ctx, "app.json".into());
        let settings: Settings = [("host".to_string(), Setting::plain("db"))].into_iter().collect();
        block_on(accessor.save(settings.clone())).unwrap();

        assert!(store.object("config-bucket", "app.json").is_some());
        assert_eq!(block_on(accessor.load()).unwrap(), settings);
    }

    #[test]
    fn test_unconfigured_accessor_fails_lazily() {
        let ctx = context(MapEnvironment::new(), Some(Arc::new(MemoryBlobStore::new())));
        let accessor = ConfigurationAccessor::from_context(&ctx, "app.json".into());
        assert!(matches!(
            block_on(accessor.load()),
            Err(ConfigurationError::MissingBucket)
        ));

        let ctx = context(MapEnvironment::new().with("CONFIG", "bucket"), None);
        let accessor = ConfigurationAccessor::from_context(&ctx, "app.json".into());
        assert!(matches!(
            block_on(accessor.load()),
            Err(ConfigurationError::MissingBlobStore)
        ));
    }
}
