//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Break-tracking backend
    #[serde(default)]
    pub server: RawServerConfig,

    /// Shared origin storage
    #[serde(default)]
    pub storage: RawStorageConfig,

    /// Timer display and status banner
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Backend location and endpoint paths
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServerConfig {
    /// Base URL (default: http://127.0.0.1:5000)
    pub base_url: Option<String>,

    /// Status endpoint path (default: /check-break-status)
    pub status_path: Option<String>,

    /// Start endpoint path (default: /start-break)
    pub start_path: Option<String>,

    /// End endpoint path (default: /end-break)
    pub end_path: Option<String>,
}

/// Storage settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Key the timer state is stored under (default: breakTimerState)
    pub key: Option<String>,

    /// Directory holding the durable storage file
    pub data_dir: Option<PathBuf>,

    /// Storage backend
    pub backend: Option<RawStorageBackend>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawStorageBackend {
    Sqlite,
    Memory,
}

/// Display settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDisplayConfig {
    /// Timer refresh cadence in milliseconds (default: 1000)
    pub tick_interval_ms: Option<u64>,

    /// How long a status message stays visible in milliseconds (default: 3000)
    pub status_dismiss_ms: Option<u64>,
}
