//! Transports between the router and storage nodes.
//!
//! The router only needs two operations per node, `fetch` and `put`, so it
//! depends on the [`Transport`] trait rather than on HTTP directly:
//!
//! - [`HttpTransport`]: `GET`/`POST {scheme}://{host}:{port}/{path}` via reqwest.
//! - [`MemoryTransport`]: routes calls to in-process [`ContentStore`]s, with
//!   failure injection for tests.
//!
//! [`ContentStore`]: circlet_store::ContentStore

mod error;
mod http;
mod memory;

pub use error::NetError;
pub use http::{DEFAULT_PORT, HttpTransport, HttpTransportConfig, Scheme};
pub use memory::MemoryTransport;

use bytes::Bytes;
use circlet_types::{Node, PutReceipt};

/// Trait abstracting the per-node content operations used by the router.
///
/// Calls are at-most-once: implementations report the first failure and
/// never retry on their own.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Read the content stored at `path` on `node`.
    async fn fetch(&self, node: &Node, path: &str) -> Result<Bytes, NetError>;

    /// Write `content` to `path` on `node`.
    async fn put(&self, node: &Node, path: &str, content: Bytes) -> Result<PutReceipt, NetError>;
}

/// Normalize a content path with the store's rules before it leaves the
/// client, so every transport rejects the same paths.
pub(crate) fn checked_path(path: &str) -> Result<String, NetError> {
    circlet_store::normalize_path(path).map_err(|_| NetError::InvalidPath(path.to_string()))
}
