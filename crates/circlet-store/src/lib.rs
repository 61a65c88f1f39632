//! Content storage trait and backend implementations.
//!
//! This crate defines the [`ContentStore`] trait a storage node uses to keep
//! the content it is assigned, along with two backends:
//!
//! - [`MemoryStore`]: in-memory storage backed by a `RwLock<HashMap>`.
//! - [`FileStore`]: one file per path under a base directory.

mod error;
mod file_store;
mod memory_store;
mod path;
mod traits;

pub use error::StoreError;
pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use path::normalize_path;
pub use traits::ContentStore;
