//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::clipboard::ClipboardService;
use crate::config::{ApiConfig, PageConfig, StorageConfig};
use crate::storage::{EntryRepository, FileShelf, JsonFileRepository, StorageResult};
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Entry store access
    pub clipboard: Arc<ClipboardService>,
    /// Shared file directory
    pub shelf: Arc<FileShelf>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// HTML page configuration
    pub page: Arc<PageConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for change notifications
    pub ws_hub: Arc<ConnectionHub>,
}

impl AppState {
    pub fn new(
        clipboard: Arc<ClipboardService>,
        shelf: Arc<FileShelf>,
        config: ApiConfig,
        page: PageConfig,
    ) -> Self {
        Self {
            clipboard,
            shelf,
            config: Arc::new(config),
            page: Arc::new(page),
            start_time: Instant::now(),
            ws_hub: Arc::new(ConnectionHub::new(HubConfig::default())),
        }
    }

    /// Build state backed by JSON files and a shelf directory
    pub async fn open(
        storage: &StorageConfig,
        config: ApiConfig,
        page: PageConfig,
    ) -> StorageResult<Self> {
        let data_dir = storage.data_path();
        tokio::fs::create_dir_all(&data_dir).await?;

        let repo: Arc<dyn EntryRepository> = Arc::new(JsonFileRepository::new(data_dir));
        let clipboard = Arc::new(ClipboardService::new(repo));
        let shelf = Arc::new(FileShelf::open(storage.shelf_path()).await?);

        Ok(Self::new(clipboard, shelf, config, page))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
