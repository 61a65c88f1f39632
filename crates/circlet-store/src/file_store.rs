//! File-based content storage backend.
//!
//! Stores one file per content path, mirroring the path's directories under
//! the base directory: `{base_dir}/{seg}/{seg}/...`.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use circlet_types::PutReceipt;
use tracing::debug;

use crate::error::StoreError;
use crate::path::normalize_path;
use crate::traits::ContentStore;

/// Suffix for in-flight writes; never listed.
const TMP_SUFFIX: &str = ".circlet-tmp";

/// File-based content store.
///
/// Writes are atomic: data is written to a temporary file first, then
/// renamed into place, so readers never see half-written content.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new file store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// The directory content is stored under.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, path: &str) -> Result<(String, PathBuf), StoreError> {
        let normalized = normalize_path(path)?;
        let full = self.base_dir.join(&normalized);
        Ok((normalized, full))
    }
}

#[async_trait::async_trait]
impl ContentStore for FileStore {
    async fn put(&self, path: &str, data: Bytes) -> Result<PutReceipt, StoreError> {
        let (path, full) = self.file_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp = full.clone().into_os_string();
        tmp.push(TMP_SUFFIX);
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &full).await?;

        debug!(%path, file = %full.display(), size = data.len(), "stored content to file");
        Ok(PutReceipt {
            path,
            size: data.len() as u64,
        })
    }

    async fn get(&self, path: &str) -> Result<Option<Bytes>, StoreError> {
        let (_, full) = self.file_path(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            // A directory sits where a file was asked for.
            Err(e) if e.kind() == std::io::ErrorKind::IsADirectory => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let (path, full) = self.file_path(path)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {
                debug!(%path, "deleted content file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn contains(&self, path: &str) -> Result<bool, StoreError> {
        let (_, full) = self.file_path(path)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut paths = Vec::new();
        let mut pending = vec![(self.base_dir.clone(), String::new())];

        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                let rel = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}/{name}")
                };

                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push((entry.path(), rel));
                } else if file_type.is_file() && !name.ends_with(TMP_SUFFIX) {
                    paths.push(rel);
                }
            }
        }
        Ok(paths)
    }
}
