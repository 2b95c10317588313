// ABOUTME: Defines the BlobStore trait for binary attachment payloads and an in-memory backend.
// ABOUTME: Keys are entity ULIDs; deleting an absent key succeeds.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use ulid::Ulid;

/// Errors that can occur in a blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob store initialization failed: {0}")]
    Init(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// An asynchronous key-value store for binary payloads.
///
/// Implementations must make each `put` atomic per key: a concurrent `get`
/// sees either the old bytes or the new bytes, never a mix. No ordering is
/// promised between different keys.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any previous value.
    async fn put(&self, key: Ulid, data: &[u8]) -> Result<(), BlobError>;

    /// Fetch the bytes stored under `key`. Returns `Ok(None)` if absent.
    async fn get(&self, key: Ulid) -> Result<Option<Vec<u8>>, BlobError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: Ulid) -> Result<(), BlobError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), BlobError>;
}

/// A blob store held entirely in memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<Ulid, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    pub async fn contains(&self, key: Ulid) -> bool {
        self.blobs.read().await.contains_key(&key)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: Ulid, data: &[u8]) -> Result<(), BlobError> {
        self.blobs.write().await.insert(key, data.to_vec());
        Ok(())
    }

    async fn get(&self, key: Ulid) -> Result<Option<Vec<u8>>, BlobError> {
        Ok(self.blobs.read().await.get(&key).cloned())
    }

    async fn delete(&self, key: Ulid) -> Result<(), BlobError> {
        self.blobs.write().await.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), BlobError> {
        self.blobs.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = MemoryBlobStore::new();
        let key = Ulid::new();

        store.put(key, b"image bytes").await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), Some(b"image bytes".to_vec()));
        assert!(store.contains(key).await);

        store.delete(key).await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_overwrites_existing_value() {
        let store = MemoryBlobStore::new();
        let key = Ulid::new();

        store.put(key, b"first").await.unwrap();
        store.put(key, b"second").await.unwrap();

        assert_eq!(store.get(key).await.unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_absent_key_is_ok() {
        let store = MemoryBlobStore::new();
        store.delete(Ulid::new()).await.unwrap();
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = MemoryBlobStore::new();
        store.put(Ulid::new(), b"a").await.unwrap();
        store.put(Ulid::new(), b"b").await.unwrap();

        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let store: std::sync::Arc<dyn BlobStore> = std::sync::Arc::new(MemoryBlobStore::new());
        let key = Ulid::new();

        store.put(key, b"x").await.unwrap();
        assert_eq!(store.get(key).await.unwrap(), Some(b"x".to_vec()));
    }
}
