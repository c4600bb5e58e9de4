//! Filesystem helpers for config and save directories.

use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use crate::error::{Error, Result};

/// Create `path` and any missing parents, like `mkdir -p`.
///
/// Succeeds if the directory already exists.
pub fn ensure_directory(path: &Path, mode: u32) -> Result<()> {
    if directory_exists(path) {
        return Ok(());
    }
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|source| Error::CreateDir {
            path: path.to_path_buf(),
            source,
        })
}

/// Returns `true` if `path` exists and is a directory.
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}
