//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is read once at startup from a TOML file.
//! Resolution order for the file itself:
//! 1. Command-line argument (highest priority)
//! 2. `HITSTER_CONFIG` environment variable
//! 3. `<config_dir>/hitster/config.toml`
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "HITSTER_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// User-Agent sent to external metadata sources
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Discogs consumer key
    #[serde(default)]
    pub discogs_key: Option<String>,

    /// Discogs consumer secret
    #[serde(default)]
    pub discogs_secret: Option<String>,

    /// HTTP endpoint settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Release-year reconciliation settings
    #[serde(default)]
    pub dates: DatesConfig,

    /// Directory holding persisted game snapshots
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// HTTP endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Reconciliation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatesConfig {
    /// Shared deadline for the whole source fan-out, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DatesConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5730
}

fn default_timeout_ms() -> u64 {
    5000
}

impl TomlConfig {
    /// Load configuration following the resolution order above
    ///
    /// An explicitly named file (CLI or environment) must exist. The
    /// platform default location is optional: when it is missing the
    /// built-in defaults are used and a warning is logged.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_arg {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Self::from_file(Path::new(&path));
            }
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            Some(path) => {
                warn!("No config file at {}, using built-in defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config: TomlConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        info!("Loaded TOML configuration from {}", path.display());
        Ok(config)
    }

    /// User-Agent for outbound requests, falling back to the crate default
    pub fn user_agent(&self) -> String {
        self.user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(get_user_agent)
    }

    /// Snapshot directory, falling back to the platform data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Default User-Agent string for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!(
        "hitster/{} ( https://github.com/hitster-rs/hitster )",
        env!("CARGO_PKG_VERSION")
    )
}

/// Platform config file location (`~/.config/hitster/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hitster").join("config.toml"))
}

/// Platform data directory (`~/.local/share/hitster` on Linux)
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hitster"))
        .unwrap_or_else(|| PathBuf::from("./hitster_data"))
}

/// Validate a secret or key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
