//! Entry store persistence
//!
//! An entry store is a JSON array of `{text, time}` objects, newest first,
//! rewritten in full on every change. [`EntryRepository`] is the seam the
//! clipboard service depends on; [`JsonFileRepository`] is the on-disk
//! implementation and [`MemoryRepository`] backs tests and ephemeral setups.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::storage::atomic::write_atomic;
use crate::storage::error::StorageResult;
use crate::storage::types::{Entry, Room, MAX_ENTRIES};

/// Load/save access to entry stores, one per room
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Load a room's entries. A missing or unreadable-as-JSON store is empty.
    async fn load(&self, room: &Room) -> StorageResult<Vec<Entry>>;

    /// Overwrite a room's entries
    async fn save(&self, room: &Room, entries: &[Entry]) -> StorageResult<()>;
}

/// Prepend a new entry and trim to [`MAX_ENTRIES`].
///
/// Returns `None` when `text` is empty or whitespace only; the store must
/// not change in that case.
pub fn append_entry(entries: &[Entry], text: &str, at: DateTime<Local>) -> Option<Vec<Entry>> {
    if text.trim().is_empty() {
        return None;
    }

    let mut updated = Vec::with_capacity(MAX_ENTRIES);
    updated.push(Entry::new(text, at));
    updated.extend(entries.iter().take(MAX_ENTRIES - 1).cloned());
    Some(updated)
}

/// Entry stores kept as JSON files in one directory
///
/// `load` only reads. A store that fails to parse loads as empty and is moved
/// aside to a uniquely named `<file>.corrupt.<stamp>` by the next `save`,
/// under the repository lock.
#[derive(Debug)]
pub struct JsonFileRepository {
    dir: PathBuf,
    /// Serializes saves with the corrupt-file check that precedes them
    write_lock: Mutex<()>,
}

impl JsonFileRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the JSON file backing `room`
    pub fn path_for(&self, room: &Room) -> PathBuf {
        self.dir.join(room.file_name())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recovery path for an unparsable store, unique per call
    fn corrupt_path(path: &Path) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let suffix = uuid::Uuid::new_v4().simple().to_string();

        let mut aside = path.as_os_str().to_owned();
        aside.push(format!(".corrupt.{}-{}", stamp, &suffix[..8]));
        PathBuf::from(aside)
    }

    /// Move the current store aside if it exists and does not parse.
    ///
    /// Must be called with `write_lock` held.
    async fn preserve_if_corrupt(path: &Path) -> StorageResult<()> {
        let content = match tokio::fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if serde_json::from_slice::<Vec<Entry>>(&content).is_ok() {
            return Ok(());
        }

        let aside = Self::corrupt_path(path);
        tokio::fs::rename(path, &aside).await?;
        tracing::warn!(
            path = %path.display(),
            moved_to = %aside.display(),
            "Corrupt entry store moved aside"
        );
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for JsonFileRepository {
    async fn load(&self, room: &Room) -> StorageResult<Vec<Entry>> {
        let path = self.path_for(room);

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<Vec<Entry>>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    room = %room,
                    error = %e,
                    "Entry store is not valid JSON, treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, room: &Room, entries: &[Entry]) -> StorageResult<()> {
        let path = self.path_for(room);
        let content = serde_json::to_vec(entries)?;

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.dir).await?;
        Self::preserve_if_corrupt(&path).await?;
        write_atomic(&path, &content).await?;

        tracing::debug!(room = %room, entries = entries.len(), "Saved entry store");
        Ok(())
    }
}

/// In-process entry stores, lost on restart
#[derive(Debug, Default)]
pub struct MemoryRepository {
    rooms: RwLock<HashMap<Room, Vec<Entry>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntryRepository for MemoryRepository {
    async fn load(&self, room: &Room) -> StorageResult<Vec<Entry>> {
        Ok(self.rooms.read().await.get(room).cloned().unwrap_or_default())
    }

    async fn save(&self, room: &Room, entries: &[Entry]) -> StorageResult<()> {
        self.rooms
            .write()
            .await
            .insert(room.clone(), entries.to_vec());
        Ok(())
    }
}
