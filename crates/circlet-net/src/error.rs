//! Error types for transport operations.

/// Errors that can occur while talking to a storage node.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The node's host and the content path do not form a valid URL.
    #[error("invalid url for {host}: {reason}")]
    InvalidUrl {
        /// The node's host.
        host: String,
        /// Why the URL was rejected.
        reason: String,
    },

    /// The content path is empty or contains `.` or `..` segments.
    #[error("invalid content path: {0:?}")]
    InvalidPath(String),

    /// The node answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The node's response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The node is unknown to the transport or marked down.
    #[error("node unreachable: {0}")]
    Unreachable(String),

    /// The node's store rejected the operation.
    #[error("store error on {node}: {source}")]
    Store {
        /// Name of the node.
        node: String,
        /// The underlying store error.
        source: circlet_store::StoreError,
    },

    /// The node has no content at the requested path.
    #[error("{path} not found on {node}")]
    NotFound {
        /// Name of the node.
        node: String,
        /// The requested path.
        path: String,
    },
}
