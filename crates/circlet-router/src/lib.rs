//! Key routing on top of the placement ring.
//!
//! The [`Router`] resolves a key to its owning node through a
//! [`SharedRing`](circlet_placement::SharedRing), then hands the actual
//! fetch or upload to a [`Transport`](circlet_net::Transport). It reads ring
//! state but never changes it.

pub mod error;
pub mod router;

pub use error::RouterError;
pub use router::Router;
