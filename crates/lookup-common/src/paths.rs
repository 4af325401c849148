//! XDG path utilities for lookup.

use std::path::PathBuf;

/// Default name of the cache database file.
pub const DATABASE_FILE_NAME: &str = "cache.db";

/// Get the directory holding the cache database.
///
/// Returns `$XDG_DATA_HOME/lookup` or falls back to
/// `~/.local/share/lookup`.
pub fn database_dir() -> PathBuf {
    let data_dir = dirs::data_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local/share")
    });
    data_dir.join("lookup")
}

/// Get the configuration file path.
///
/// Returns `$XDG_CONFIG_HOME/lookup/config.toml` or falls back to
/// `~/.config/lookup/config.toml`.
pub fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".config")
    });
    config_dir.join("lookup").join("config.toml")
}
