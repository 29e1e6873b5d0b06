//! In-memory collaborators for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::client::{BlobStore, ClientError, ClientResult};

/// A [`BlobStore`] that keeps every object in memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object, replacing any previous content.
    pub fn insert(&self, bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .insert((bucket.into(), key.into()), body.into());
    }

    /// Returns a copy of an object without going through the async interface.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, bucket: &str, key: &str) -> ClientResult<Vec<u8>> {
        self.object(bucket, key)
            .ok_or_else(|| ClientError::not_found(format!("{bucket}/{key}")))
    }

    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>) -> ClientResult<()> {
        self.insert(bucket, key, body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::block_on;

    #[test]
    fn test_put_then_get() {
        let store = MemoryBlobStore::new();
        block_on(store.put("bucket", "file.json", b"{}".to_vec())).unwrap();
        assert_eq!(block_on(store.get("bucket", "file.json")).unwrap(), b"{}");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_object() {
        let store = MemoryBlobStore::new();
        let err = block_on(store.get("bucket", "missing")).unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }
}
