//! Core trait for content storage.

use bytes::Bytes;
use circlet_types::PutReceipt;

use crate::error::StoreError;

/// Trait for storing and retrieving content by path.
///
/// All implementations must be `Send + Sync` for use across async tasks.
/// Paths are normalized with [`normalize_path`](crate::normalize_path)
/// before use, so `"a/b"` and `"/a//b"` name the same content.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store content at `path`, replacing anything already there.
    async fn put(&self, path: &str, data: Bytes) -> Result<PutReceipt, StoreError>;

    /// Retrieve content. Returns `None` if nothing is stored at `path`.
    async fn get(&self, path: &str) -> Result<Option<Bytes>, StoreError>;

    /// Delete content. Deleting a missing path is not an error.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Check whether content exists at `path`.
    async fn contains(&self, path: &str) -> Result<bool, StoreError>;

    /// List all stored paths.
    async fn list(&self) -> Result<Vec<String>, StoreError>;
}
