//! Default paths for breakwatch components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/breakwatch/config.toml` or `~/.config/breakwatch/config.toml`
//! - Data: `$XDG_DATA_HOME/breakwatch` or `~/.local/share/breakwatch`

use std::path::PathBuf;

/// Environment variable for overriding the data directory
pub const BREAKWATCH_DATA_DIR_ENV: &str = "BREAKWATCH_DATA_DIR";

/// Environment variable for overriding the server base URL
pub const BREAKWATCH_SERVER_ENV: &str = "BREAKWATCH_SERVER";

/// Application subdirectory name
const APP_DIR: &str = "breakwatch";

/// File name of the durable origin storage inside the data directory
pub const STORAGE_FILENAME: &str = "origin-storage.db";

/// Get the default configuration file path.
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(APP_DIR).join("config.toml")
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$BREAKWATCH_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/breakwatch` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/breakwatch` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(BREAKWATCH_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the BREAKWATCH_DATA_DIR env var.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
