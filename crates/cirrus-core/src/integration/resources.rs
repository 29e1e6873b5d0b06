//! Shared, immutable resources handed to every invocation.

use std::fmt;
use std::sync::Arc;

use crate::foundation::env::{Environment, ProcessEnvironment};

use super::client::{BlobStore, FunctionInvoker, KeyService};

/// Everything a pipeline may need from the outside world.
///
/// Built once when the function starts and shared by `Arc` across
/// invocations. Nothing in here is mutated after construction.
///
/// # Example
///
/// ```rust,ignore
/// let resources = Resources::builder()
///     .environment(MapEnvironment::new().with("NAMESPACE", "test"))
///     .blob_store(MemoryBlobStore::new())
///     .build();
/// ```
#[derive(Clone)]
pub struct Resources {
    environment: Arc<dyn Environment>,
    blob_store: Option<Arc<dyn BlobStore>>,
    key_service: Option<Arc<dyn KeyService>>,
    invoker: Option<Arc<dyn FunctionInvoker>>,
}

impl Resources {
    /// Starts building a resource set.
    pub fn builder() -> ResourcesBuilder {
        ResourcesBuilder::default()
    }

    /// The environment values are read from.
    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    /// Reads one environment value.
    pub fn env_var(&self, name: &str) -> Option<String> {
        self.environment.var(name)
    }

    /// The object store, if configured.
    pub fn blob_store(&self) -> Option<&Arc<dyn BlobStore>> {
        self.blob_store.as_ref()
    }

    /// The key service, if configured.
    pub fn key_service(&self) -> Option<&Arc<dyn KeyService>> {
        self.key_service.as_ref()
    }

    /// The function invoker, if configured.
    pub fn invoker(&self) -> Option<&Arc<dyn FunctionInvoker>> {
        self.invoker.as_ref()
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("environment", &self.environment)
            .field("blob_store", &self.blob_store.is_some())
            .field("key_service", &self.key_service.is_some())
            .field("invoker", &self.invoker.is_some())
            .finish()
    }
}

/// Builder for [`Resources`].
#[derive(Default)]
pub struct ResourcesBuilder {
    environment: Option<Arc<dyn Environment>>,
    blob_store: Option<Arc<dyn BlobStore>>,
    key_service: Option<Arc<dyn KeyService>>,
    invoker: Option<Arc<dyn FunctionInvoker>>,
}

impl ResourcesBuilder {
    /// Sets the environment. Defaults to [`ProcessEnvironment`].
    pub fn environment(mut self, environment: impl Environment) -> Self {
        self.environment = Some(Arc::new(environment));
        self
    }

    /// Sets the object store.
    pub fn blob_store(self, store: impl BlobStore + 'static) -> Self {
        self.shared_blob_store(Arc::new(store))
    }

    /// Sets an already shared object store.
    pub fn shared_blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Sets the key service.
    pub fn key_service(self, keys: impl KeyService + 'static) -> Self {
        self.shared_key_service(Arc::new(keys))
    }

    /// Sets an already shared key service.
    pub fn shared_key_service(mut self, keys: Arc<dyn KeyService>) -> Self {
        self.key_service = Some(keys);
        self
    }

    /// Sets the function invoker.
    pub fn invoker(mut self, invoker: impl FunctionInvoker + 'static) -> Self {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    /// Finishes the resource set.
    pub fn build(self) -> Resources {
        Resources {
            environment: self
                .environment
                .unwrap_or_else(|| Arc::new(ProcessEnvironment)),
            blob_store: self.blob_store,
            key_service: self.key_service,
            invoker: self.invoker,
        }
    }
}
