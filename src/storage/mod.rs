//! ClipShelf Storage
//!
//! This module provides the on-disk state of the service:
//!
//! - **types**: Core data structures (Entry, Room, SharedFile)
//! - **entries**: Entry store persistence and the append-and-trim rule
//! - **shelf**: Shared file directory
//! - **atomic**: Write-temp-then-rename helpers
//! - **error**: Error types
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//!   clipboard_entries.json     default room
//!   entries_<room>.json        one per named room
//!   shared_files/              the shelf
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use clipshelf::storage::{append_entry, EntryRepository, JsonFileRepository, Room};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = JsonFileRepository::new("./data");
//!
//!     let entries = repo.load(&Room::Default).await?;
//!     if let Some(updated) = append_entry(&entries, "hello", chrono::Local::now()) {
//!         repo.save(&Room::Default, &updated).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod atomic;
pub mod entries;
pub mod error;
pub mod shelf;
pub mod types;

// Re-export commonly used types
pub use entries::{append_entry, EntryRepository, JsonFileRepository, MemoryRepository};
pub use error::{StorageError, StorageResult};
pub use shelf::{FileShelf, UploadOutcome};
pub use types::{validate_file_name, Entry, Room, SharedFile, MAX_ENTRIES, TIME_FORMAT};
