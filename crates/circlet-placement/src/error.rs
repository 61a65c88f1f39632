//! Error types for ring placement.

use circlet_types::{Node, Slot};

/// Errors that can occur while building or querying the ring.
#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    /// The ring was configured with an unusable parameter (e.g. `M == 0`).
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),

    /// A node hashed onto a slot that is already occupied.
    #[error("slot collision at {slot:x}: {candidate} hashes onto the slot held by {existing}")]
    Collision {
        /// The contested slot.
        slot: Slot,
        /// The node already holding the slot.
        existing: Node,
        /// The node that was being inserted.
        candidate: Node,
    },

    /// A node with the same name is already registered.
    #[error("node already on the ring: {0}")]
    DuplicateNode(Node),

    /// The node is not registered at the slot its host hashes to.
    #[error("node not on the ring: {0}")]
    NotFound(Node),

    /// A lookup was attempted against a ring with no nodes.
    #[error("ring is empty")]
    EmptyRing,
}
