//! Per-request staging of uploaded documents.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FALLBACK_FILE_NAME: &str = "upload";

/// An uploaded file written to a private directory under the documents dir.
///
/// The directory and everything in it are removed when this value is dropped,
/// which covers every exit path of the request that owns it.
pub struct StagedUpload {
    _dir: TempDir,
    path: PathBuf,
}

impl StagedUpload {
    pub async fn write(
        documents_dir: &Path,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(documents_dir)?;
        let path = dir.path().join(sanitize_file_name(file_name));
        tokio::fs::write(&path, bytes).await?;
        log::debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Keep only the final component of a client-supplied file name.
fn sanitize_file_name(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(|name| name.replace('\0', ""))
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}
