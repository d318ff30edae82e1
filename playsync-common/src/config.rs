//! Settings file loading and path resolution
//!
//! The settings file path is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `PLAYSYNC_CONFIG` environment variable
//! 3. `<user config dir>/playsync/config.toml`
//! 4. `/etc/playsync/config.toml`
//!
//! Unlike a long-running service the importer has no usable defaults for its
//! endpoints, so a missing file is an error rather than a fallback.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the settings file
pub const CONFIG_ENV_VAR: &str = "PLAYSYNC_CONFIG";

/// Default Locator probe step in days
pub const DEFAULT_INITIAL_STEP: u32 = 32;

/// Complete settings file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Detection source (read-only)
    pub acr: AcrSettings,
    /// Play-history destination
    pub raar: RaarSettings,
    #[serde(default)]
    pub importer: ImporterSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Detection source endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AcrSettings {
    /// Base URL; `access_key` and `date` are appended as query parameters
    pub url: String,
    pub access_key: String,
}

/// Destination endpoint and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct RaarSettings {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub options: TransportOptions,
}

/// HTTP transport options for the destination client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransportOptions {
    /// Per-request timeout; reqwest default (none) when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Skip TLS certificate verification (self-signed installs)
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Import behavior
#[derive(Debug, Clone, Deserialize)]
pub struct ImporterSettings {
    /// Plays lasting this many seconds or less are not submitted
    #[serde(default)]
    pub minimum_duration: f64,

    /// Initial probe step of the earliest-date search, in days
    #[serde(default = "default_initial_step")]
    pub initial_step: u32,
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            minimum_duration: 0.0,
            initial_step: DEFAULT_INITIAL_STEP,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Where log records go; `file` when only `file` is set, else `stdout`
    #[serde(default)]
    pub output: Option<LogOutput>,

    /// Log file path, required by `output = "file"`
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Configured log sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    File,
    /// Local syslog daemon, "SEVERITY message" lines
    Syslog,
}

/// Resolved log sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination<'a> {
    Stdout,
    File(&'a Path),
    Syslog,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: None,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve `output` and `file` into one sink
    pub fn destination(&self) -> Result<LogDestination<'_>> {
        match (self.output, self.file.as_deref()) {
            (Some(LogOutput::Stdout), _) => Ok(LogDestination::Stdout),
            (Some(LogOutput::Syslog), _) => Ok(LogDestination::Syslog),
            (Some(LogOutput::File) | None, Some(path)) => Ok(LogDestination::File(path)),
            (Some(LogOutput::File), None) => Err(Error::Config(
                "logging.output = \"file\" requires logging.file".to_string(),
            )),
            (None, None) => Ok(LogDestination::Stdout),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_initial_step() -> u32 {
    DEFAULT_INITIAL_STEP
}

impl Settings {
    /// Read, parse and validate the settings file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading settings");
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read settings file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the importer cannot run with
    pub fn validate(&self) -> Result<()> {
        require("acr.url", &self.acr.url)?;
        require("acr.access_key", &self.acr.access_key)?;
        require("raar.url", &self.raar.url)?;
        require("raar.username", &self.raar.username)?;

        if !self.importer.minimum_duration.is_finite() || self.importer.minimum_duration < 0.0 {
            return Err(Error::Config(format!(
                "importer.minimum_duration must be a non-negative number of seconds, got {}",
                self.importer.minimum_duration
            )));
        }
        if self.importer.initial_step == 0 {
            return Err(Error::Config(
                "importer.initial_step must be at least 1 day".to_string(),
            ));
        }
        self.logging.destination()?;
        Ok(())
    }
}

fn require(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Config(format!("{} must not be blank", key)))
    } else {
        Ok(())
    }
}

/// Locate the settings file following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    // Priority 3 and 4: user, then system config file
    let user_config = dirs::config_dir().map(|d| d.join("playsync").join("config.toml"));
    let system_config = PathBuf::from("/etc/playsync/config.toml");

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }
    if system_config.exists() {
        return Ok(system_config);
    }

    Err(Error::Config(format!(
        "No settings file found. Pass --config, set {} or create ~/.config/playsync/config.toml",
        CONFIG_ENV_VAR
    )))
}
