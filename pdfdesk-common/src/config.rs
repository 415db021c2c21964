//! Configuration loading and API base URL resolution
//!
//! Bootstrap settings come from an optional TOML file. The base URL of the
//! remote document service is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PDFDESK_API_URL`)
//! 3. TOML config file (`api_url`)
//! 4. Compiled default (fallback)
//!
//! A missing TOML file never prevents startup; a malformed one does.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Environment variable consulted for the API base URL
pub const API_URL_ENV: &str = "PDFDESK_API_URL";

/// Compiled default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Quiet interval before a burst of edits is written, in milliseconds
pub const DEFAULT_WRITE_QUIET_MS: u64 = 500;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the remote document service
    #[serde(default)]
    pub api_url: Option<String>,

    /// Coalescing quiet interval for record edits
    #[serde(default = "default_write_quiet_ms")]
    pub write_quiet_ms: u64,

    /// UI event bus capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            write_quiet_ms: default_write_quiet_ms(),
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_write_quiet_ms() -> u64 {
    DEFAULT_WRITE_QUIET_MS
}

fn default_event_capacity() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load the config file at `path` (or the platform default location)
    ///
    /// A missing file logs a warning and yields defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(path = %path.display(), "Loading config file");
        Self::from_file(&path)
    }
}

/// Default config file location for the platform
///
/// `~/.config/pdfdesk/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdfdesk").join("config.toml"))
}

/// Resolve the API base URL following the priority order above
pub fn resolve_api_url(cli_arg: Option<&str>, env_var_name: &str, toml: &TomlConfig) -> Result<String> {
    // Priority 1: Command-line argument
    if let Some(url) = cli_arg {
        return normalize_api_url(url);
    }

    // Priority 2: Environment variable
    if let Ok(url) = std::env::var(env_var_name) {
        if !url.trim().is_empty() {
            return normalize_api_url(&url);
        }
    }

    // Priority 3: TOML config file
    if let Some(url) = toml.api_url.as_deref() {
        return normalize_api_url(url);
    }

    // Priority 4: Compiled default
    Ok(DEFAULT_API_URL.to_string())
}

/// Validate a base URL and strip trailing slashes
///
/// The URL must parse, use http or https, and name a host.
pub fn normalize_api_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::Config(format!("Invalid API URL {:?}: {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API URL must use http or https: {:?}",
            url
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(Error::Config(format!("API URL has no host: {:?}", url)));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote document service, without trailing slash
    pub api_url: String,
    /// Coalescing quiet interval for record edits
    pub write_quiet: Duration,
    /// UI event bus capacity
    pub event_capacity: usize,
    /// Log level directive
    pub log_level: String,
}

impl ClientConfig {
    /// Defaults for the given base URL
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            write_quiet: Duration::from_millis(DEFAULT_WRITE_QUIET_MS),
            event_capacity: default_event_capacity(),
            log_level: default_log_level(),
        }
    }

    /// Resolve configuration from command line, environment and TOML file
    pub fn resolve(cli_api_url: Option<&str>, config_path: Option<&Path>) -> Result<Self> {
        let toml = TomlConfig::load_or_default(config_path)?;
        Self::from_toml(cli_api_url, &toml)
    }

    pub fn from_toml(cli_api_url: Option<&str>, toml: &TomlConfig) -> Result<Self> {
        let api_url = resolve_api_url(cli_api_url, API_URL_ENV, toml)?;

        if toml.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be greater than 0".to_string()));
        }

        Ok(Self {
            api_url,
            write_quiet: Duration::from_millis(toml.write_quiet_ms),
            event_capacity: toml.event_capacity,
            log_level: toml.logging.level.clone(),
        })
    }
}
