//! Consistent hashing ring implementation.

use std::sync::Arc;

use circlet_types::{Node, Slot};
use tracing::debug;

use crate::error::PlacementError;
use crate::hash::HashFunction;

/// One occupied position on the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingEntry {
    /// Where the node sits.
    pub slot: Slot,
    /// The node holding the slot.
    pub node: Node,
}

/// Whether the ring currently holds any node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    /// No nodes registered; lookups fail with [`PlacementError::EmptyRing`].
    Empty,
    /// At least one node registered.
    NonEmpty,
}

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The key that moves.
    pub key: String,
    /// Owner before the change.
    pub from: Node,
    /// Owner after the change.
    pub to: Node,
}

/// Consistent hashing ring over a sorted vector of entries.
///
/// Entries are kept strictly ascending by slot, one entry per node. The
/// number of nodes is the length of that vector; nothing else counts them.
/// A key is owned by the first entry whose slot is `>=` the key's slot,
/// wrapping around to the first entry when the key lies past the last one.
#[derive(Debug, Clone)]
pub struct Ring {
    entries: Vec<RingEntry>,
    hasher: Arc<dyn HashFunction>,
}

impl Ring {
    /// Create an empty ring using the given hash function.
    pub fn new(hasher: Arc<dyn HashFunction>) -> Self {
        Self {
            entries: Vec::new(),
            hasher,
        }
    }

    /// Build a ring from a node list.
    ///
    /// The resulting ring does not depend on the order of `nodes`. Fails on
    /// the first node that cannot be inserted.
    pub fn with_nodes(
        hasher: Arc<dyn HashFunction>,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<Self, PlacementError> {
        let mut ring = Self::new(hasher);
        for node in nodes {
            ring.insert(node)?;
        }
        Ok(ring)
    }

    /// Register a node at the slot its host hashes to.
    ///
    /// Returns the slot. Fails with [`PlacementError::Collision`] if another
    /// node already holds that slot, or [`PlacementError::DuplicateNode`] if
    /// a node with the same name is registered. The ring is untouched on
    /// failure.
    pub fn insert(&mut self, node: Node) -> Result<Slot, PlacementError> {
        if self.contains(&node) {
            return Err(PlacementError::DuplicateNode(node));
        }

        let slot = self.slot_of(&node);
        let index = self.lower_bound(&slot);

        if let Some(existing) = self.entries.get(index)
            && existing.slot == slot
        {
            return Err(PlacementError::Collision {
                slot,
                existing: existing.node.clone(),
                candidate: node,
            });
        }

        debug!(%node, %slot, index, "inserting node into ring");
        self.entries.insert(
            index,
            RingEntry {
                slot: slot.clone(),
                node,
            },
        );
        Ok(slot)
    }

    /// Unregister a node. Returns the slot it occupied.
    ///
    /// Fails with [`PlacementError::NotFound`] if the node's slot is empty or
    /// held by a node with a different name.
    pub fn remove(&mut self, node: &Node) -> Result<Slot, PlacementError> {
        let slot = self.slot_of(node);
        let index = self.lower_bound(&slot);

        match self.entries.get(index) {
            Some(entry) if entry.slot == slot && entry.node == *node => {}
            _ => return Err(PlacementError::NotFound(node.clone())),
        }

        let before = self.entries.len();
        let removed = self.entries.remove(index);
        debug_assert_eq!(self.entries.len() + 1, before);

        debug!(node = %removed.node, slot = %removed.slot, index, "removed node from ring");
        Ok(removed.slot)
    }

    /// Find the node that owns `key`.
    pub fn successor_of(&self, key: &[u8]) -> Result<&Node, PlacementError> {
        self.successor_of_slot(&self.hasher.slot(key))
    }

    /// Find the node that owns an already-computed slot.
    ///
    /// A slot equal to a node's slot belongs to that node.
    pub fn successor_of_slot(&self, slot: &Slot) -> Result<&Node, PlacementError> {
        let index = self.lower_bound(slot);
        // Past the last entry: wrap to the first.
        self.entries
            .get(index)
            .or_else(|| self.entries.first())
            .map(|entry| &entry.node)
            .ok_or(PlacementError::EmptyRing)
    }

    /// Compute the slot a node occupies (or would occupy).
    pub fn slot_of(&self, node: &Node) -> Slot {
        self.hasher.slot(node.placement_key())
    }

    /// Whether a node with this name is registered.
    pub fn contains(&self, node: &Node) -> bool {
        self.entries.iter().any(|entry| entry.node == *node)
    }

    /// Current state of the ring.
    pub fn state(&self) -> RingState {
        if self.entries.is_empty() {
            RingState::Empty
        } else {
            RingState::NonEmpty
        }
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ring order (ascending slot).
    pub fn entries(&self) -> &[RingEntry] {
        &self.entries
    }

    /// Nodes in ring order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|entry| &entry.node)
    }

    /// The hash function placing nodes and keys.
    pub fn hasher(&self) -> &Arc<dyn HashFunction> {
        &self.hasher
    }

    /// List the keys whose owner differs between `old` and `new`.
    ///
    /// Keys that have no owner in either ring (because it is empty) are
    /// skipped.
    pub fn diff<K: AsRef<str>>(old: &Ring, new: &Ring, keys: &[K]) -> Vec<Reassignment> {
        keys.iter()
            .filter_map(|key| {
                let key = key.as_ref();
                let from = old.successor_of(key.as_bytes()).ok()?;
                let to = new.successor_of(key.as_bytes()).ok()?;
                (from != to).then(|| Reassignment {
                    key: key.to_string(),
                    from: from.clone(),
                    to: to.clone(),
                })
            })
            .collect()
    }

    /// Index of the first entry whose slot is `>= slot`.
    fn lower_bound(&self, slot: &Slot) -> usize {
        self.entries.partition_point(|entry| entry.slot < *slot)
    }
}
