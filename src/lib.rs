//! # ClipShelf
//!
//! Shared clipboard and file shelf - pass text and files between devices
//! through a small HTTP service.
//!
//! ## Features
//!
//! - **Clipboard rooms**: the latest 20 submissions per room, newest first,
//!   persisted as one JSON file per room
//! - **File shelf**: a flat shared directory with upload, download and delete
//! - **Atomic saves**: temp file plus rename, never a half-written store
//! - **Real-time**: WebSocket notifications when a room or the shelf changes
//!
//! ## Modules
//!
//! - [`storage`]: Entry store, room naming and the file shelf
//! - [`clipboard`]: Submit / clear / view operations on a room
//! - [`render`]: Server-side HTML page
//! - [`websocket`]: Change notification hub
//! - [`api`]: REST API and page routes with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use clipshelf::clipboard::{ClipboardService, RequestContext};
//! use clipshelf::storage::{EntryRepository, JsonFileRepository, Room};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo: Arc<dyn EntryRepository> = Arc::new(JsonFileRepository::new("clipshelf_data"));
//!     let clipboard = ClipboardService::new(repo);
//!
//!     let ctx = RequestContext::new(Room::Default);
//!     clipboard.submit(&ctx, "hello").await?;
//!
//!     let view = clipboard.view(&ctx).await?;
//!     println!("Latest: {:?}", view.latest.map(|e| e.text));
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod clipboard;
pub mod config;
pub mod render;
pub mod storage;
pub mod websocket;

pub use clipboard::{ClipboardService, ClipboardView, RequestContext, SubmitOutcome};
pub use config::Config;
