//! In-memory content storage backend.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use circlet_types::PutReceipt;
use tracing::debug;

use crate::error::StoreError;
use crate::path::normalize_path;
use crate::traits::ContentStore;

/// In-memory content store backed by a `RwLock<HashMap>`.
///
/// Useful for testing and for nodes configured to run in memory-only mode.
/// Tracks total bytes stored against a configurable maximum.
pub struct MemoryStore {
    content: RwLock<HashMap<String, Bytes>>,
    max_bytes: u64,
}

impl MemoryStore {
    /// Create a new in-memory store with the given capacity limit.
    pub fn new(max_bytes: u64) -> Self {
        Self {
            content: RwLock::new(HashMap::new()),
            max_bytes,
        }
    }

    /// Total bytes currently stored.
    pub fn used_bytes(&self) -> u64 {
        let map = self.content.read().expect("lock poisoned");
        Self::used_bytes_unlocked(&map)
    }

    fn used_bytes_unlocked(map: &HashMap<String, Bytes>) -> u64 {
        map.values().map(|v| v.len() as u64).sum()
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, path: &str, data: Bytes) -> Result<PutReceipt, StoreError> {
        let path = normalize_path(path)?;
        let mut map = self.content.write().expect("lock poisoned");
        let used = Self::used_bytes_unlocked(&map);
        let data_len = data.len() as u64;

        // Replacing existing content frees its bytes first.
        let existing_len = map.get(&path).map_or(0, |v| v.len() as u64);
        let net_increase = data_len.saturating_sub(existing_len);

        if used + net_increase > self.max_bytes {
            return Err(StoreError::CapacityExceeded {
                needed: net_increase,
                available: self.max_bytes.saturating_sub(used),
            });
        }

        debug!(%path, size = data_len, "storing content in memory");
        map.insert(path.clone(), data);
        Ok(PutReceipt {
            path,
            size: data_len,
        })
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        let path = normalize_path(path)?;
        let map = self.content.read().expect("lock poisoned");
        Ok(map.get(&path).cloned())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let path = normalize_path(path)?;
        let mut map = self.content.write().expect("lock poisoned");
        map.remove(&path);
        debug!(%path, "deleted content from memory");
        Ok(())
    }

    async fn contains(&self, path: &str) -> Result<bool, StoreError> {
        let path = normalize_path(path)?;
        let map = self.content.read().expect("lock poisoned");
        Ok(map.contains_key(&path))
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let map = self.content.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }
}
