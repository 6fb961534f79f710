//! File shelf
//!
//! A directory used as a flat namespace of shared files. A file's name is its
//! only key and its only metadata. Uploading a name that already exists is a
//! silent no-op: the existing bytes win, whatever the new content is.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::storage::atomic::write_temp;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{validate_file_name, SharedFile};

/// Result of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was written
    Stored,
    /// A file with the same name already existed; nothing was written
    Skipped,
}

/// Shared directory of uploaded files
#[derive(Debug)]
pub struct FileShelf {
    dir: PathBuf,
    /// Serializes mutations so exists-check and rename cannot interleave
    write_lock: Mutex<()>,
}

impl FileShelf {
    /// Open a shelf, creating its directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &str) -> StorageResult<PathBuf> {
        validate_file_name(name)?;
        Ok(self.dir.join(name))
    }

    /// Store `contents` under `name` unless that name is taken
    pub async fn upload(&self, name: &str, contents: &[u8]) -> StorageResult<UploadOutcome> {
        let target = self.path_of(name)?;
        let _guard = self.write_lock.lock().await;

        if tokio::fs::try_exists(&target).await? {
            tracing::info!(file = %name, "Upload skipped, name already on shelf");
            return Ok(UploadOutcome::Skipped);
        }

        let tmp = write_temp(&target, contents).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::info!(file = %name, bytes = contents.len(), "File stored on shelf");
        Ok(UploadOutcome::Stored)
    }

    /// Current files, in directory order
    pub async fn list(&self) -> StorageResult<Vec<SharedFile>> {
        let mut files = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(files),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            // Hidden names are in-flight temp files
            if name.starts_with('.') {
                continue;
            }

            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                files.push(SharedFile {
                    name,
                    size: metadata.len(),
                });
            }
        }

        Ok(files)
    }

    /// Read a file's bytes for download
    pub async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_of(name)?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::Io(e),
        })
    }

    /// Remove one file
    pub async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.path_of(name)?;
        let _guard = self.write_lock.lock().await;

        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::Io(e),
        })?;

        tracing::info!(file = %name, "File deleted from shelf");
        Ok(())
    }

    /// Remove every file by removing and recreating the directory
    pub async fn delete_all(&self) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        match tokio::fs::remove_dir_all(&self.dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tokio::fs::create_dir_all(&self.dir).await?;

        tracing::info!(dir = %self.dir.display(), "Shelf cleared");
        Ok(())
    }
}
