use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "PTYTEST_CONFIG";

/// Largest polling granularity screen assertions may use.
pub const MAX_POLL_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// `$PTYTEST_CONFIG` wins when set. Otherwise uses
    /// `~/.config/ptytest/config.toml` on Unix, or the equivalent from
    /// `dirs::config_dir()`, falling back to the current directory.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("ptytest").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - Terminal dimensions are non-zero
    /// - Assertion polling stays within 1..=100 ms
    /// - Broadcaster interval is non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.width == 0 || session.height == 0 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Terminal size must be non-zero (got {}x{})",
                    session.width, session.height
                ),
            });
        }

        if session.poll_interval_ms == 0 || session.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "session.poll_interval_ms must be within 1..={} (got {})",
                    MAX_POLL_INTERVAL_MS, session.poll_interval_ms
                ),
            });
        }

        if self.broadcast.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "broadcast.poll_interval_ms must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
