//! Configuration management for vitals.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use chrono::Utc;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::StorageBackend;
use crate::view::try_format_local;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "vitals";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "health.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `VITALS_`, sections split on `__`)
/// 2. TOML config file at `~/.config/vitals/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which engine holds the records.
    pub backend: StorageBackend,
    /// Path to the database file.
    /// Defaults to `~/.local/share/vitals/health.db`
    pub database_path: Option<PathBuf>,
    /// `SQLite` journal mode applied on open.
    pub journal_mode: JournalMode,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `strftime` format for record timestamps, rendered in local time.
    pub time_format: String,
    /// Maximum number of history rows to show.
    /// Set to 0 for unlimited.
    pub list_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: "%Y-%m-%d %H:%M".to_string(),
            list_limit: 50,
        }
    }
}

/// `SQLite` journal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JournalMode {
    /// Rollback journal deleted at the end of each transaction.
    Delete,
    /// Rollback journal truncated instead of deleted.
    Truncate,
    /// Rollback journal header zeroed instead of deleted.
    Persist,
    /// Rollback journal kept in memory.
    Memory,
    /// Write-ahead log.
    #[default]
    Wal,
    /// No rollback journal.
    Off,
}

impl JournalMode {
    /// The pragma value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Persist => "PERSIST",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
            Self::Off => "OFF",
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file at `config_path`, or the default path (if exists)
    /// 3. Environment variables (prefixed with `VITALS_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("VITALS_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.display.time_format.trim().is_empty() {
            return Err(Error::config_validation("time_format must not be empty"));
        }

        // Some specifiers only work for parsing and fail when rendering
        if StrftimeItems::new(&self.display.time_format).any(|item| matches!(item, Item::Error))
            || try_format_local(Utc::now(), &self.display.time_format).is_none()
        {
            return Err(Error::config_validation(format!(
                "invalid time_format: {}",
                self.display.time_format
            )));
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::config_validation("database_path must not be empty"));
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the history row limit, `None` when unlimited.
    #[must_use]
    pub fn list_limit(&self) -> Option<usize> {
        match self.display.list_limit {
            0 => None,
            n => Some(n),
        }
    }
}
