//! In-process transport backed by content stores.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use circlet_store::ContentStore;
use circlet_types::{Node, PutReceipt};
use tokio::sync::RwLock;

use crate::error::NetError;
use crate::{Transport, checked_path};

/// Transport that routes operations to in-memory stores keyed by node name.
///
/// Supports failure injection: nodes marked down are unreachable.
#[derive(Default)]
pub struct MemoryTransport {
    stores: RwLock<HashMap<String, Arc<dyn ContentStore>>>,
    down_nodes: RwLock<HashSet<String>>,
}

impl MemoryTransport {
    /// Create a transport with no reachable nodes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the store that serves `node`.
    pub async fn register(&self, node: &Node, store: Arc<dyn ContentStore>) {
        self.stores
            .write()
            .await
            .insert(node.name().to_string(), store);
    }

    /// Mark a node unreachable (`true`) or reachable again (`false`).
    pub async fn set_down(&self, node: &Node, down: bool) {
        let mut set = self.down_nodes.write().await;
        if down {
            set.insert(node.name().to_string());
        } else {
            set.remove(node.name());
        }
    }

    async fn store_for(&self, node: &Node) -> Result<Arc<dyn ContentStore>, NetError> {
        if self.down_nodes.read().await.contains(node.name()) {
            return Err(NetError::Unreachable(format!("{node} is down")));
        }
        self.stores
            .read()
            .await
            .get(node.name())
            .cloned()
            .ok_or_else(|| NetError::Unreachable(format!("{node} is not registered")))
    }

    fn store_error(node: &Node, source: circlet_store::StoreError) -> NetError {
        NetError::Store {
            node: node.name().to_string(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    async fn fetch(&self, node: &Node, path: &str) -> Result<Bytes, NetError> {
        checked_path(path)?;
        let store = self.store_for(node).await?;
        store
            .get(path)
            .await
            .map_err(|e| Self::store_error(node, e))?
            .ok_or_else(|| NetError::NotFound {
                node: node.name().to_string(),
                path: path.to_string(),
            })
    }

    async fn put(&self, node: &Node, path: &str, content: Bytes) -> Result<PutReceipt, NetError> {
        checked_path(path)?;
        let store = self.store_for(node).await?;
        store
            .put(path, content)
            .await
            .map_err(|e| Self::store_error(node, e))
    }
}
