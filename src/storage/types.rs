//! Core data types for the clipboard store and the file shelf
//!
//! - `Entry`: one saved text snippet with its timestamp
//! - `Room`: which entry store a request addresses
//! - `SharedFile`: one file on the shelf

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::StorageError;

/// Maximum number of entries kept in a store
pub const MAX_ENTRIES: usize = 20;

/// Format of `Entry::time`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Length of a generated room token
pub const ROOM_TOKEN_LEN: usize = 8;

/// A single clipboard entry
///
/// Entries carry no identifier. Position in the store is the ordering,
/// index 0 being the newest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// The submitted text, stored verbatim
    pub text: String,
    /// Local timestamp formatted with [`TIME_FORMAT`]
    pub time: String,
}

impl Entry {
    /// Create an entry stamped with the given local time
    pub fn new(text: impl Into<String>, at: DateTime<Local>) -> Self {
        Self {
            text: text.into(),
            time: at.format(TIME_FORMAT).to_string(),
        }
    }
}

/// Identifies one entry store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    /// The shared store everyone sees without a room token
    Default,
    /// A room partitioned by an 8-character token
    Named(String),
}

impl Room {
    /// Spelling of the default room in URLs and topics
    pub const DEFAULT_NAME: &'static str = "default";

    /// Generate a fresh random room
    pub fn generate() -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Room::Named(token[..ROOM_TOKEN_LEN].to_string())
    }

    /// Name of the JSON file backing this room
    pub fn file_name(&self) -> String {
        match self {
            Room::Default => "clipboard_entries.json".to_string(),
            Room::Named(token) => format!("entries_{}.json", token),
        }
    }

    /// Name used in URLs and websocket topics
    pub fn as_str(&self) -> &str {
        match self {
            Room::Default => Self::DEFAULT_NAME,
            Room::Named(token) => token,
        }
    }

    /// Websocket topic carrying this room's updates
    pub fn topic(&self) -> String {
        format!("room.{}", self.as_str())
    }
}

impl FromStr for Room {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::DEFAULT_NAME {
            return Ok(Room::Default);
        }

        if s.len() == ROOM_TOKEN_LEN && s.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(Room::Named(s.to_string()))
        } else {
            Err(StorageError::InvalidRoom(s.to_string()))
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file on the shelf
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedFile {
    /// File name, also its key on the shelf
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Check that a shelf file name is a single plain path component
pub fn validate_file_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.len() > 255;

    if invalid {
        Err(StorageError::InvalidFileName(name.to_string()))
    } else {
        Ok(())
    }
}
