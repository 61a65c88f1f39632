//! Path normalization shared by every backend.

use crate::error::StoreError;

/// Normalize a content path to `seg/seg/...` form.
///
/// Leading, trailing and repeated slashes are dropped. Empty paths and `.`
/// or `..` segments are rejected so a path can never escape a store root.
pub fn normalize_path(path: &str) -> Result<String, StoreError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." | ".." => return Err(StoreError::InvalidPath(path.to_string())),
            s if s.contains('\\') || s.contains('\0') => {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments.join("/"))
}
