//! Error types for content storage operations.

/// Errors that can occur during content storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The path is empty, absolute, or escapes the store root.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The store has reached its capacity limit.
    #[error("store capacity exceeded: need {needed} bytes, only {available} available")]
    CapacityExceeded {
        /// Bytes needed for the operation.
        needed: u64,
        /// Bytes currently available.
        available: u64,
    },
}
