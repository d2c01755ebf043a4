//! Configuration management for yt-tracker
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Upper bound the videos.list endpoint accepts for a single `id` list
pub const MAX_BATCH_SIZE: usize = 50;

/// Environment variable that replaces `api.base_url` after loading
pub const API_URL_ENV: &str = "YT_TRACKER_API_URL";

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "yt-tracker.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reference time zone used to stamp snapshot days
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Upstream API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Input and history file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Dashboard configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Where this config was loaded from (internal)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Upstream API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// videos.list endpoint
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Number of IDs per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,

    /// Delay before each attempt, in seconds; its length is the attempt count
    #[serde(default = "default_retry_delays")]
    pub retry_delays_secs: Vec<u64>,

    /// Optional proxy for all requests (HTTP_PROXY/HTTPS_PROXY apply otherwise)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Honor HTTP_PROXY/HTTPS_PROXY when no explicit proxy is set
    #[serde(default = "default_use_env_proxy")]
    pub use_env_proxy: bool,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Input and history file locations, relative to the working directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input_file")]
    pub input_file: String,

    #[serde(default = "default_history_file")]
    pub history_file: String,
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How long a loaded history table stays fresh
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Re-render interval in watch mode
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Maximum sparkline width
    #[serde(default = "default_sparkline_width")]
    pub sparkline_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            api: ApiConfig::default(),
            paths: PathsConfig::default(),
            dashboard: DashboardConfig::default(),
            source: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key_env: default_api_key_env(),
            batch_size: default_batch_size(),
            timeout_secs: default_api_timeout(),
            retry_delays_secs: default_retry_delays(),
            proxy: None,
            use_env_proxy: default_use_env_proxy(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            history_file: default_history_file(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            refresh_secs: default_refresh_secs(),
            sparkline_width: default_sparkline_width(),
        }
    }
}

impl ApiConfig {
    /// Retry schedule as durations
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|secs| Duration::from_secs(*secs))
            .collect()
    }
}

impl Config {
    /// Per-user config location (~/.config/yt-tracker/config.toml on Linux)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yt-tracker").join("config.toml"))
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.source = Some(config_path.to_path_buf());
        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration: explicit path, then ./yt-tracker.toml, then the
    /// per-user config, then built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(user) = Self::user_config_path().filter(|p| p.exists()) {
            return Self::load(&user);
        }

        debug!("No config file found, using defaults");
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Apply `YT_TRACKER_API_URL` on top of file values and defaults
    pub fn apply_env_overrides(&mut self) {
        self.override_base_url(std::env::var(API_URL_ENV).ok());
    }

    fn override_base_url(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            debug!("api.base_url overridden by {}", API_URL_ENV);
            self.api.base_url = url;
        }
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(Error::MissingApiKey(self.api.api_key_env.clone())),
        }
    }

    /// Parsed reference time zone
    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| Error::InvalidTimeZone(self.time_zone.clone()))
    }

    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.input_file)
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.paths.history_file)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.tz()?;

        Url::parse(&self.api.base_url)
            .map_err(|e| Error::Config(format!("api.base_url is not a valid URL: {}", e)))?;

        if self.api.batch_size == 0 || self.api.batch_size > MAX_BATCH_SIZE {
            return Err(Error::Config(format!(
                "api.batch_size must be between 1 and {}",
                MAX_BATCH_SIZE
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be positive".to_string(),
            ));
        }

        if self.api.retry_delays_secs.is_empty() {
            return Err(Error::Config(
                "api.retry_delays_secs needs at least one entry".to_string(),
            ));
        }

        if let Some(proxy) = &self.api.proxy {
            Url::parse(proxy)
                .map_err(|e| Error::Config(format!("api.proxy is not a valid URL: {}", e)))?;
        }

        if self.paths.history_file.trim().is_empty() {
            return Err(Error::Config(
                "paths.history_file must not be empty".to_string(),
            ));
        }

        if self.dashboard.refresh_secs == 0 {
            return Err(Error::Config(
                "dashboard.refresh_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
