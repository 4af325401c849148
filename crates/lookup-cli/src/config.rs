//! Configuration loading and defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Page cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding the database file. Environment variables and `~` are expanded.
    #[serde(default = "default_directory_path")]
    pub directory_path: String,
    /// Database file name inside `directory_path`.
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Log every search.
    #[serde(default = "default_true")]
    pub save_searches: bool,
    /// Write fetched pages to the cache.
    #[serde(default = "default_true")]
    pub save_pages: bool,
    /// Serve pages from the cache when fresh.
    #[serde(default = "default_true")]
    pub use_saved_pages: bool,
    /// How long a cached page stays fresh, e.g. "2h" or "1d".
    #[serde(default = "default_page_expiration_time")]
    pub page_expiration_time: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            directory_path: default_directory_path(),
            file_name: default_file_name(),
            save_searches: true,
            save_pages: true,
            use_saved_pages: true,
            page_expiration_time: default_page_expiration_time(),
        }
    }
}

impl DatabaseConfig {
    /// Expand environment variables and `~` in the configured directory.
    ///
    /// References to unset variables are left as written.
    pub fn expanded_directory(&self) -> PathBuf {
        let expanded = shellexpand::full_with_context_no_errors(
            &self.directory_path,
            || dirs::home_dir().map(|home| home.to_string_lossy().into_owned()),
            |var| std::env::var(var).ok(),
        );
        PathBuf::from(expanded.as_ref())
    }
}

/// Remote lookup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Wiki serving dictionary and translation pages.
    #[serde(default = "default_dictionary_host")]
    pub dictionary_host: String,
    /// Wiki serving encyclopedia articles.
    #[serde(default = "default_encyclopedia_host")]
    pub encyclopedia_host: String,
    /// Language section printed by `dict` unless `--raw` is given.
    #[serde(default = "default_language")]
    pub language: String,
    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            dictionary_host: default_dictionary_host(),
            encyclopedia_host: default_encyclopedia_host(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_directory_path() -> String {
    lookup_common::database_dir().to_string_lossy().into_owned()
}

fn default_file_name() -> String {
    lookup_common::DATABASE_FILE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_expiration_time() -> String {
    "2h".to_string()
}

fn default_dictionary_host() -> String {
    "en.wiktionary.org".to_string()
}

fn default_encyclopedia_host() -> String {
    "en.wikipedia.org".to_string()
}

fn default_language() -> String {
    "English".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from file, or return defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = lookup_common::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
