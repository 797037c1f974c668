use crate::{ApiError, ApiResult};

use su_core::STAGING_SUFFIX;

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Only the literal `false` turns the restart off. The first `reboot`
/// parameter wins when it is repeated.
pub fn reboot_requested(query: &[(String, String)]) -> bool {
    !query
        .iter()
        .find(|(key, _)| key == "reboot")
        .is_some_and(|(_, value)| value == "false")
}

/// Last path component of an uploaded file name, split on both `/` and `\`
/// whatever the host platform.
pub fn upload_basename(file_name: Option<&str>) -> Option<&str> {
    let name = file_name?.rsplit(['/', '\\']).next()?;
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// `<exe dir>/<basename>_new`
pub fn staging_path(exe_dir: &Path, basename: &str) -> PathBuf {
    exe_dir.join(format!("{basename}{STAGING_SUFFIX}"))
}

/// A staging file being written.
///
/// Dropped before `commit`, it removes the file, including when the
/// request future is dropped mid-upload because the client went away.
pub struct StagingFile {
    path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl StagingFile {
    /// Create (or truncate) the file at `path`.
    pub async fn create(path: &Path) -> ApiResult<Self> {
        let file = File::create(path).await.map_err(|e| {
            ApiError::internal(format!("Failed to create {}: {e}", path.display()))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            committed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the field into the file and sync it to disk.
    pub async fn write_field(&mut self, field: &mut Field<'_>) -> ApiResult<u64> {
        let path = self.path.clone();
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| ApiError::internal(format!("{} already closed", path.display())))?;

        let mut written = 0u64;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await.map_err(|e| {
                ApiError::internal(format!("Failed to write {}: {e}", path.display()))
            })?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to flush {}: {e}", path.display())))?;
        file.sync_all()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to sync {}: {e}", path.display())))?;

        Ok(written)
    }

    /// Give the file the permissions of `original`.
    ///
    /// The staged file is moved over the executable later, so it has to be
    /// executable wherever the original was.
    pub async fn copy_permissions_from(&self, original: &Path) -> ApiResult<()> {
        let permissions = tokio::fs::metadata(original)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to read {}: {e}", original.display())))?
            .permissions();

        tokio::fs::set_permissions(&self.path, permissions)
            .await
            .map_err(|e| {
                ApiError::internal(format!(
                    "Failed to set permissions on {}: {e}",
                    self.path.display()
                ))
            })
    }

    /// Keep the file; returns its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.file.take();
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.file.take();
        let _ = std::fs::remove_file(&self.path);
    }
}
