//! Configuration management for the dataset tools.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings. Command-line flags are applied
//! on top of the loaded values by the binary.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Jikan genre id for "Isekai"
pub const GENRE_ISEKAI: u32 = 62;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,

    /// Jikan API client settings
    pub jikan: JikanConfig,

    /// What to fetch and where to write it
    pub dataset: DatasetConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
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

/// Jikan API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Total attempts per request (rate-limited and network failures share this budget)
    pub max_attempts: u32,

    /// Initial retry delay in milliseconds, doubled after every failed attempt
    pub retry_delay_ms: u64,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Dataset selection and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Genre filter for the anime list
    pub genre_id: u32,

    /// Total number of anime to fetch
    pub anime_limit: usize,

    /// Maximum characters kept per anime
    pub character_limit: usize,

    /// Fetch characters and write the character file
    pub include_characters: bool,

    /// Optional `order_by` for the list endpoint (e.g. "popularity")
    pub order_by: Option<String>,

    /// Optional `sort` for the list endpoint ("asc" or "desc")
    pub sort: Option<String>,

    /// Optional `sfw` filter for the list endpoint
    pub sfw: Option<bool>,

    /// Cap on anime whose characters are fetched at once (None = no cap)
    pub max_concurrent_anime: Option<usize>,

    /// Anime CSV output path
    pub anime_file: PathBuf,

    /// Character CSV output path
    pub character_file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            user_agent: concat!("isekai-dataset/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 30,
            max_attempts: 5,
            retry_delay_ms: 1000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            requests_per_minute: 50,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            genre_id: GENRE_ISEKAI,
            anime_limit: 10,
            character_limit: 10,
            include_characters: true,
            order_by: None,
            sort: None,
            sfw: None,
            max_concurrent_anime: None,
            anime_file: PathBuf::from("anime.csv"),
            character_file: PathBuf::from("characters.csv"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns `None` if the file doesn't exist, so the caller can fall back
    /// to defaults and report it once logging is up.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Some(config))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        let rate = &self.jikan.rate_limit;
        if !(rate.requests_per_second.is_finite() && rate.requests_per_second > 0.0) {
            bail!(
                "requests_per_second must be positive, got {}",
                rate.requests_per_second
            );
        }
        if rate.requests_per_minute == 0 {
            bail!("requests_per_minute must be at least 1");
        }
        if self.jikan.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.dataset.max_concurrent_anime == Some(0) {
            bail!("max_concurrent_anime must be at least 1 when set");
        }
        Ok(())
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.logging.log_dir)
    }
}
