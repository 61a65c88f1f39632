//! [`Router`]: resolve a key's owner, then talk to it.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use circlet_net::Transport;
use circlet_placement::SharedRing;
use circlet_types::{Node, PutReceipt};
use tracing::{debug, info};

use crate::error::RouterError;

/// Routes content operations to the node that owns each key.
///
/// The owner is resolved under the ring's read lock, which is released
/// before any transport call starts; a slow node never blocks ring readers
/// or membership changes.
#[derive(Clone)]
pub struct Router {
    ring: SharedRing,
    transport: Arc<dyn Transport>,
}

impl Router {
    /// Create a router over a shared ring and a transport.
    pub fn new(ring: SharedRing, transport: Arc<dyn Transport>) -> Self {
        Self { ring, transport }
    }

    /// The ring this router reads. Membership changes go through it directly.
    pub fn ring(&self) -> &SharedRing {
        &self.ring
    }

    /// Return the node owning `key`.
    pub fn assign(&self, key: &str) -> Result<Node, RouterError> {
        let node = self.ring.assign(key.as_bytes())?;
        debug!(key, %node, "assigned key");
        Ok(node)
    }

    /// Read the local file at `path` and upload it to the node owning `path`.
    ///
    /// The path string itself is the key, so a later [`fetch`](Self::fetch)
    /// with the same string reaches the same node.
    pub async fn upload(&self, path: &str) -> Result<PutReceipt, RouterError> {
        let node = self.assign(path)?;
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| RouterError::LocalRead {
                path: Path::new(path).to_path_buf(),
                source,
            })?;
        self.put_to(&node, path, Bytes::from(content)).await
    }

    /// Upload caller-supplied content under `key`.
    pub async fn upload_bytes(&self, key: &str, content: Bytes) -> Result<PutReceipt, RouterError> {
        let node = self.assign(key)?;
        self.put_to(&node, key, content).await
    }

    /// Fetch the content stored under `path` from its owner.
    pub async fn fetch(&self, path: &str) -> Result<Bytes, RouterError> {
        let node = self.assign(path)?;
        let content = self.transport.fetch(&node, path).await?;
        debug!(path, %node, size = content.len(), "fetched content");
        Ok(content)
    }

    async fn put_to(
        &self,
        node: &Node,
        key: &str,
        content: Bytes,
    ) -> Result<PutReceipt, RouterError> {
        let size = content.len();
        let receipt = self.transport.put(node, key, content).await?;
        info!(key, %node, size, "uploaded content");
        Ok(receipt)
    }
}
