//! Shared, lock-guarded ring handle.
//!
//! [`SharedRing`] is what the rest of the system holds on to. Lookups take
//! the lock in read mode and clone the owning node out, so no guard ever
//! outlives the call; membership changes take it in write mode.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use circlet_types::{Node, Slot};
use tracing::info;

use crate::error::PlacementError;
use crate::ring::{Ring, RingState};

/// Cloneable handle to a ring shared between concurrent callers.
#[derive(Debug, Clone)]
pub struct SharedRing {
    inner: Arc<RwLock<Ring>>,
}

impl SharedRing {
    /// Wrap a ring for shared use.
    pub fn new(ring: Ring) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    /// Register a node. See [`Ring::insert`].
    pub fn insert(&self, node: Node) -> Result<Slot, PlacementError> {
        let mut ring = self.write();
        let slot = ring.insert(node.clone())?;
        info!(%node, %slot, nodes = ring.len(), "node joined ring");
        Ok(slot)
    }

    /// Unregister a node. See [`Ring::remove`].
    pub fn remove(&self, node: &Node) -> Result<Slot, PlacementError> {
        let mut ring = self.write();
        let slot = ring.remove(node)?;
        info!(%node, %slot, nodes = ring.len(), "node left ring");
        Ok(slot)
    }

    /// Resolve the node owning `key`.
    ///
    /// The read lock is released before this returns.
    pub fn assign(&self, key: &[u8]) -> Result<Node, PlacementError> {
        self.read().successor_of(key).cloned()
    }

    /// Copy the current ring, e.g. to diff against a proposed change.
    pub fn snapshot(&self) -> Ring {
        self.read().clone()
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Current state of the ring.
    pub fn state(&self) -> RingState {
        self.read().state()
    }

    // Ring operations never leave the entries half-updated, so a poisoned
    // lock still guards a valid ring.
    fn read(&self) -> RwLockReadGuard<'_, Ring> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ring> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Ring> for SharedRing {
    fn from(ring: Ring) -> Self {
        Self::new(ring)
    }
}
