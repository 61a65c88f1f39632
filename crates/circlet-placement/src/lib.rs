//! Consistent hashing ring for deterministic key placement.
//!
//! Every storage node sits at exactly one slot on the ring: the hash of its
//! host, reduced into `[0, M)`. A key belongs to the first node clockwise
//! from the key's own slot, wrapping past the highest slot back to the
//! lowest. Adding or removing a node therefore only moves the keys in the
//! arc that node owns.
//!
//! - [`HashFunction`] / [`DigestHasher`] map bytes to a [`Slot`](circlet_types::Slot)
//!   with exact big-integer arithmetic.
//! - [`Ring`] holds the sorted entries and implements insert, remove and
//!   successor lookup.
//! - [`SharedRing`] is the lock-guarded handle that concurrent callers share.

mod error;
mod hash;
mod ring;
mod shared;

pub use error::PlacementError;
pub use hash::{DigestHasher, HashAlgorithm, HashFunction, parse_modulus};
pub use ring::{Reassignment, Ring, RingEntry, RingState};
pub use shared::SharedRing;
