//! Error types for the router.

use std::path::PathBuf;

/// Errors that can occur while routing a request.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The ring could not resolve an owner (e.g. it is empty).
    #[error("placement error: {0}")]
    Placement(#[from] circlet_placement::PlacementError),

    /// The owning node's transport failed. Passed through untouched.
    #[error("transport error: {0}")]
    Transport(#[from] circlet_net::NetError),

    /// The local file to upload could not be read.
    #[error("failed to read {path}: {source}")]
    LocalRead {
        /// The local path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
