//! ClipShelf Server
//!
//! Run with: cargo run --bin clipshelf
//!
//! # Configuration
//!
//! Read from `config.toml` (see `clipshelf-cli config`), then overridden by:
//! - `CLIPSHELF_DATA_DIR`: Entry store directory
//! - `CLIPSHELF_SHELF_DIR`: Shared files directory (default: `<data_dir>/shared_files`)
//! - `CLIPSHELF_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `CLIPSHELF_API_PORT`: Port to listen on (default: 8085)
//! - `CLIPSHELF_REFRESH_SECS`: Page fallback refresh interval (default: 15)
//! - `CLIPSHELF_LOG_LEVEL`, `CLIPSHELF_LOG_FORMAT`: Logging (`RUST_LOG` wins)

use clipshelf::api::{serve, AppState};
use clipshelf::config::{Config, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();

    init_tracing(&config.logging);
    config.validate()?;

    tracing::info!("Starting ClipShelf v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Data directory: {:?}", config.storage.data_path());
    tracing::info!("Shelf directory: {:?}", config.storage.shelf_path());

    let state = AppState::open(&config.storage, config.api.clone(), config.page.clone()).await?;

    serve(state, &config.api).await?;

    tracing::info!("ClipShelf stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` takes precedence over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("clipshelf={},tower_http={}", logging.level, logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
