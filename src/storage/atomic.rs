//! Write-temp-then-rename helpers
//!
//! Readers of a file replaced through [`write_atomic`] observe either the old
//! contents or the new contents, never a partial write. Temp files live next
//! to their target (same filesystem, so the rename is atomic) and start with
//! a dot, which keeps them out of shelf listings.

use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Sibling temp path for `target`
pub fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    target.with_file_name(format!(".{}.{}.tmp", name, &suffix[..12]))
}

/// Write `contents` to a fresh temp file next to `target` and fsync it.
///
/// Returns the temp path; the caller decides whether to rename it into place.
pub async fn write_temp(target: &Path, contents: &[u8]) -> io::Result<PathBuf> {
    let tmp = temp_path(target);

    let result = async {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        Ok::<(), io::Error>(())
    }
    .await;

    match result {
        Ok(()) => Ok(tmp),
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp).await;
            Err(e)
        }
    }
}

/// Atomically replace `target` with `contents`
pub async fn write_atomic(target: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = write_temp(target, contents).await?;

    if let Err(e) = tokio::fs::rename(&tmp, target).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    Ok(())
}
