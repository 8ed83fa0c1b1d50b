//! Maps logical memory names onto `.mv2` files inside the data directory.

use crate::error::ApiError;
use memvid_api_types::{MEMORY_FILE_EXTENSION, MemoryEntry};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Resolve `name` to `<data_dir>/<name>.mv2`.
///
/// Names containing a path separator, a NUL byte, or nothing at all are
/// rejected, so the result always names a direct child of `data_dir`.
pub fn resolve(data_dir: &Path, name: &str) -> Result<PathBuf, ApiError> {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(ApiError::InvalidName);
    }
    Ok(data_dir.join(format!("{}.{}", name, MEMORY_FILE_EXTENSION)))
}

/// Resolve `name` and require the memory file to exist.
pub fn resolve_existing(data_dir: &Path, name: &str) -> Result<PathBuf, ApiError> {
    let path = resolve(data_dir, name)?;
    if !path.is_file() {
        return Err(ApiError::NotFound);
    }
    Ok(path)
}

/// Scan `data_dir` for memory files, sorted by name.
///
/// A missing data directory lists as empty.
pub fn list(data_dir: &Path) -> Result<Vec<MemoryEntry>, ApiError> {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut memories = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(MEMORY_FILE_EXTENSION) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        memories.push(MemoryEntry {
            name: stem.to_string(),
            path: path.to_string_lossy().to_string(),
        });
    }
    memories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(memories)
}
