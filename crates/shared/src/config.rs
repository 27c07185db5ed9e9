//! Configuration management for the sync pipeline.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. API keys and the target username
//! are overlaid from the environment (`TRAKT_API_KEY`, `TMDB_API_KEY`,
//! `TRAKT_USERNAME`) so secrets never live in the config file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Trakt API settings
    pub trakt: TraktConfig,

    /// TMDB API settings
    pub tmdb: TmdbConfig,

    /// Cover generation settings
    #[serde(default)]
    pub cover: CoverConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root output directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Trakt API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraktConfig {
    /// Trakt API base URL
    pub base_url: String,

    /// API key (client id), normally supplied via TRAKT_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Target username, normally supplied via TRAKT_USERNAME
    pub username: String,

    /// Maximum attempts when the server answers 429
    pub max_retries: u32,

    /// Fallback wait when a 429 carries no Retry-After header, in seconds
    pub retry_after_default_secs: u64,
}

/// TMDB API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// TMDB API base URL
    pub base_url: String,

    /// TMDB image CDN base URL
    pub image_base_url: String,

    /// API key, normally supplied via TMDB_API_KEY
    #[serde(default)]
    pub api_key: String,

    /// Poster size to download (w92..w780, original)
    pub poster_size: String,

    /// Backdrop size to download (w300..w1280, original)
    pub backdrop_size: String,

    /// Fixed delay before every outbound call, in milliseconds
    pub request_delay_ms: u64,

    /// Maximum attempts when the server answers 429
    pub max_retries: u32,

    /// Fallback wait when a 429 carries no Retry-After header, in seconds
    pub retry_after_default_secs: u64,
}

/// Cover generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverConfig {
    /// CDN base URL that serves the downloaded artwork
    pub cdn_base_url: String,

    /// Canvas width in pixels
    pub width: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Poster columns per row
    pub columns: u32,

    /// Poster rows
    pub rows: u32,

    /// JPEG quality for the final image
    pub jpeg_quality: u8,

    /// Per-poster download timeout in seconds
    pub download_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "public".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: true,
                json_format: false,
            },
            trakt: TraktConfig {
                base_url: "https://api.trakt.tv".to_string(),
                api_key: String::new(),
                username: "lrs".to_string(),
                max_retries: 3,
                retry_after_default_secs: 60,
            },
            tmdb: TmdbConfig {
                base_url: "https://api.themoviedb.org/3".to_string(),
                image_base_url: "https://image.tmdb.org/t/p".to_string(),
                api_key: String::new(),
                poster_size: "w780".to_string(),
                backdrop_size: "w1280".to_string(),
                request_delay_ms: 250,
                max_retries: 3,
                retry_after_default_secs: 10,
            },
            cover: CoverConfig::default(),
        }
    }
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            cdn_base_url: "https://cfcdn.sayed.app/watch".to_string(),
            width: 896,
            height: 272,
            columns: 10,
            rows: 2,
            jpeg_quality: 95,
            download_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load configuration from a TOML file, then overlay environment values
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Overlay secrets and the target username from the environment
    ///
    /// `TRAKT_API_KEY` and `TMDB_API_KEY` always win over file values;
    /// `TRAKT_USERNAME` wins when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("TRAKT_API_KEY") {
            if !key.is_empty() {
                self.trakt.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                self.tmdb.api_key = key;
            }
        }
        if let Ok(username) = std::env::var("TRAKT_USERNAME") {
            if !username.is_empty() {
                self.trakt.username = username;
            }
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Fail unless a Trakt API key is configured
    ///
    /// Checked before any network call so a missing key aborts the run
    /// up front instead of failing on the first request.
    pub fn require_trakt_key(&self) -> Result<&str> {
        if self.trakt.api_key.is_empty() {
            bail!("TRAKT_API_KEY is not set (environment or [trakt] api_key)");
        }
        Ok(&self.trakt.api_key)
    }

    /// Fail unless a TMDB API key is configured
    pub fn require_tmdb_key(&self) -> Result<&str> {
        if self.tmdb.api_key.is_empty() {
            bail!("TMDB_API_KEY is not set (environment or [tmdb] api_key)");
        }
        Ok(&self.tmdb.api_key)
    }

    /// Get the absolute path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "public");
        assert_eq!(config.trakt.base_url, "https://api.trakt.tv");
        assert_eq!(config.trakt.username, "lrs");
        assert_eq!(config.trakt.retry_after_default_secs, 60);
        assert_eq!(config.tmdb.retry_after_default_secs, 10);
        assert_eq!(config.tmdb.request_delay_ms, 250);
        assert_eq!(config.cover.width, 896);
        assert_eq!(config.cover.height, 272);
        assert_eq!(config.cover.jpeg_quality, 95);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let original_config = Config::default();
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.trakt.base_url, original_config.trakt.base_url);
        assert_eq!(
            loaded_config.cover.cdn_base_url,
            original_config.cover.cdn_base_url
        );

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "public");
    }

    #[test]
    fn test_missing_keys_are_fatal() {
        let config = Config::default();
        assert!(config.require_trakt_key().is_err());
        assert!(config.require_tmdb_key().is_err());

        let mut config = Config::default();
        config.trakt.api_key = "abc".to_string();
        assert_eq!(config.require_trakt_key().unwrap(), "abc");
    }

    #[test]
    fn test_log_dir_resolution() {
        let config = Config::default();
        assert!(config.log_dir().ends_with("public/logs"));

        let mut config = Config::default();
        config.logging.log_dir = "/var/log/trakt".to_string();
        assert_eq!(config.log_dir(), PathBuf::from("/var/log/trakt"));
    }
}
