//! Validated settings

use crate::schema::{
    RawConfig, RawDisplayConfig, RawServerConfig, RawStorageBackend, RawStorageConfig,
};
use breakwatch_util::default_data_dir;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_STATUS_PATH: &str = "/check-break-status";
pub const DEFAULT_START_PATH: &str = "/start-break";
pub const DEFAULT_END_PATH: &str = "/end-break";
pub const DEFAULT_STORAGE_KEY: &str = "breakTimerState";
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_STATUS_DISMISS: Duration = Duration::from_secs(3);

/// Validated settings ready for use by a tab host
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub display: DisplayConfig,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            server: ServerConfig::from_raw(raw.server),
            storage: StorageConfig::from_raw(raw.storage),
            display: DisplayConfig::from_raw(raw.display),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::from_raw(RawServerConfig::default()),
            storage: StorageConfig::from_raw(RawStorageConfig::default()),
            display: DisplayConfig::from_raw(RawDisplayConfig::default()),
        }
    }
}

/// Break-tracking backend endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
    pub status_path: String,
    pub start_path: String,
    pub end_path: String,
}

impl ServerConfig {
    fn from_raw(raw: RawServerConfig) -> Self {
        Self {
            base_url: raw
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            status_path: raw
                .status_path
                .unwrap_or_else(|| DEFAULT_STATUS_PATH.to_string()),
            start_path: raw
                .start_path
                .unwrap_or_else(|| DEFAULT_START_PATH.to_string()),
            end_path: raw.end_path.unwrap_or_else(|| DEFAULT_END_PATH.to_string()),
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}{}", self.base_url, self.status_path)
    }

    pub fn start_url(&self) -> String {
        format!("{}{}", self.base_url, self.start_path)
    }

    pub fn end_url(&self) -> String {
        format!("{}{}", self.base_url, self.end_path)
    }
}

/// Where the shared timer state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Durable SQLite file under `data_dir`
    Sqlite,
    /// Process memory only
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub key: String,
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
}

impl StorageConfig {
    fn from_raw(raw: RawStorageConfig) -> Self {
        Self {
            key: raw.key.unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
            backend: match raw.backend {
                Some(RawStorageBackend::Memory) => StorageBackend::Memory,
                Some(RawStorageBackend::Sqlite) | None => StorageBackend::Sqlite,
            },
        }
    }
}

/// Timer and status banner timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    pub tick_interval: Duration,
    pub status_dismiss: Duration,
}

impl DisplayConfig {
    fn from_raw(raw: RawDisplayConfig) -> Self {
        Self {
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            status_dismiss: raw
                .status_dismiss_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STATUS_DISMISS),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::from_raw(RawDisplayConfig::default())
    }
}
