//! Shared types for Circlet.
//!
//! This crate defines the value types passed between the placement ring,
//! the transports and the router: [`Node`] (a storage node's identity and
//! endpoint), [`Slot`] (a position on the ring) and [`PutReceipt`] (the
//! acknowledgement a node returns after storing content).

use std::fmt;
use std::hash::{Hash, Hasher};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A storage node: a stable name plus the network endpoint it serves on.
///
/// Two nodes are equal when their names are equal; the host is where the
/// node lives, not who it is. The ring places a node by hashing its host
/// (see [`Node::placement_key`]).
#[derive(Clone, Serialize, Deserialize)]
pub struct Node {
    name: String,
    host: String,
}

impl Node {
    /// Create a node from its name and host.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
        }
    }

    /// The node's identity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's network endpoint (`host` or `host:port`).
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Bytes hashed to compute this node's ring slot.
    pub fn placement_key(&self) -> &[u8] {
        self.host.as_bytes()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.host)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self})")
    }
}

// ---------------------------------------------------------------------------
// Slot
// ---------------------------------------------------------------------------

/// A position on the ring, in `[0, M)`.
///
/// Backed by an arbitrary-precision integer so that a full 256-bit digest
/// is never truncated.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(BigUint);

impl Slot {
    /// Borrow the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consume the slot, returning the underlying integer.
    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

impl From<BigUint> for Slot {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<u64> for Slot {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::LowerHex for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Transport payloads
// ---------------------------------------------------------------------------

/// Acknowledgement returned by a node after it stored content at a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutReceipt {
    /// Path the content was stored under.
    pub path: String,
    /// Number of bytes stored.
    pub size: u64,
}
