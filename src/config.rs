//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where entry stores and the shelf live
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Shelf directory; defaults to `<data_dir>/shared_files`
    #[serde(default)]
    pub shelf_dir: Option<String>,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("clipshelf").to_string_lossy().to_string())
        .unwrap_or_else(|| "./clipshelf_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            shelf_dir: None,
        }
    }
}

impl StorageConfig {
    /// Directory holding the entry store JSON files
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    /// Directory used as the file shelf
    pub fn shelf_path(&self) -> PathBuf {
        match &self.shelf_dir {
            Some(dir) => expand_home(dir),
            None => self.data_path().join("shared_files"),
        }
    }
}

/// `path` without `.` components, for comparing configured directories
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8085
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    200 * 1024 * 1024 // 200 MB
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTML page configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
    /// Fallback reload interval for pages without a live connection
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    #[serde(default = "default_title")]
    pub title: String,
}

/// Shortest fallback reload interval a page will use
pub const MIN_REFRESH_SECS: u64 = 1;

fn default_refresh_secs() -> u64 {
    15
}

fn default_title() -> String {
    "Common Clipboard".to_string()
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            title: default_title(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let mut config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        config.normalize();
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("clipshelf").join("config.toml")),
            Some(PathBuf::from("/etc/clipshelf/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("CLIPSHELF_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(shelf_dir) = var("CLIPSHELF_SHELF_DIR") {
            self.storage.shelf_dir = Some(shelf_dir);
        }

        // API overrides
        if let Some(host) = var("CLIPSHELF_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("CLIPSHELF_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Page overrides
        if let Some(secs) = var("CLIPSHELF_REFRESH_SECS").and_then(|s| s.parse().ok()) {
            self.page.refresh_secs = secs;
        }

        // Logging overrides
        if let Some(level) = var("CLIPSHELF_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CLIPSHELF_LOG_FORMAT") {
            self.logging.format = format;
        }

        self.normalize();
    }

    /// Clamp values that would make the page misbehave
    fn normalize(&mut self) {
        if self.page.refresh_secs < MIN_REFRESH_SECS {
            tracing::warn!(
                refresh_secs = self.page.refresh_secs,
                "page.refresh_secs too small, using {}",
                MIN_REFRESH_SECS
            );
            self.page.refresh_secs = MIN_REFRESH_SECS;
        }
    }

    /// Reject configurations that would lose data at runtime.
    ///
    /// Deleting every shared file removes the whole shelf directory, so it
    /// must not be the data directory or one of its ancestors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let data = lexical(&self.storage.data_path());
        let shelf = lexical(&self.storage.shelf_path());

        if data.starts_with(&shelf) {
            return Err(ConfigError::Invalid(format!(
                "shelf_dir {:?} must not contain data_dir {:?}",
                shelf, data
            )));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# ClipShelf Configuration
#
# Environment variables override these settings:
# - CLIPSHELF_DATA_DIR
# - CLIPSHELF_SHELF_DIR
# - CLIPSHELF_API_HOST
# - CLIPSHELF_API_PORT
# - CLIPSHELF_REFRESH_SECS
# - CLIPSHELF_LOG_LEVEL
# - CLIPSHELF_LOG_FORMAT

[storage]
# Directory holding clipboard_entries.json and entries_<room>.json
data_dir = "~/.local/share/clipshelf"

# Shared file directory (default: <data_dir>/shared_files)
# shelf_dir = "/srv/clipshelf/shared_files"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8085

# Allowed CORS origins (empty: any origin)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

# Largest accepted upload in bytes
max_upload_bytes = 209715200

[page]
# Reload interval for pages without a live connection (seconds)
refresh_secs = 15

# Page title
title = "Common Clipboard"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
