//! # Configuration
//!
//! Configuration loading for the Kitchen POS Store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     KITCHENPOS_DB_PATH=/var/lib/kitchenpos/pos.db                      │
//! │     KITCHENPOS_DB_MAX_CONNECTIONS=8                                    │
//! │     KITCHENPOS_LOG=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/kitchenpos.toml (Linux)                              │
//! │     ~/Library/Application Support/com.kitchenpos.pos/kitchenpos.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, 5 connections, "info,kitchenpos=debug,..."      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # kitchenpos.toml
//! [database]
//! path = "/var/lib/kitchenpos/pos.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//!
//! [logging]
//! filter = "info,kitchenpos=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::pool::DbConfig;

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,kitchenpos=debug,sqlx=warn";

// =============================================================================
// Config Error
// =============================================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "kitchenpos", "pos")
        .map(|dirs| dirs.data_dir().join("kitchenpos.db"))
        .unwrap_or_else(|| PathBuf::from("kitchenpos.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive string.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KitchenPosConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl KitchenPosConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`kitchenpos.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document. Missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(format!(
                "database.min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        if EnvFilter::try_new(&self.logging.filter).is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging.filter is not a valid filter: {}",
                self.logging.filter
            )));
        }

        Ok(())
    }

    /// Builds the pool configuration.
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("KITCHENPOS_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("KITCHENPOS_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid KITCHENPOS_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(filter) = lookup("KITCHENPOS_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "kitchenpos", "pos")
            .map(|dirs| dirs.config_dir().join("kitchenpos.toml"))
    }
}

// =============================================================================
// Tracing
// =============================================================================

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter.
pub fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // try_init: a second call (tests, embedding) is not an error
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = KitchenPosConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = KitchenPosConfig::from_toml(
            r#"
            [database]
            path = "/tmp/pos.db"
            max_connections = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/pos.db"));
        assert_eq!(config.database.max_connections, 8);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_config_validation() {
        let mut config = KitchenPosConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.database.min_connections = 3;
        assert!(config.validate().is_err());

        config.database.min_connections = 1;
        assert!(config.validate().is_ok());

        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("KITCHENPOS_DB_PATH", "/srv/pos.db"),
            ("KITCHENPOS_DB_MAX_CONNECTIONS", "not-a-number"),
            ("KITCHENPOS_LOG", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = KitchenPosConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/srv/pos.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kitchenpos.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/from-file.db\"\nconnect_timeout_secs = 3\n",
        )
        .unwrap();

        let config = KitchenPosConfig::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let db = config.to_db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/from-file.db"));
        assert_eq!(db.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kitchenpos.toml");
        std::fs::write(&path, "[database\npath = ").unwrap();

        let err = KitchenPosConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
