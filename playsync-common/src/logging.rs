//! Logging initialization
//!
//! Filter precedence: `RUST_LOG`, then the explicit override (CLI), then the
//! configured level. Records go to stdout, an append-mode file, or syslog.

use crate::config::{LogDestination, LoggingConfig};
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Program name reported to syslog
#[cfg(unix)]
const SYSLOG_IDENTITY: &std::ffi::CStr = c"playsync-importer";

/// Build the filter without installing anything
pub fn build_filter(config: &LoggingConfig, level_override: Option<&str>) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = level_override.unwrap_or(&config.level);
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", level, e)))
}

/// Install the global tracing subscriber
///
/// File and syslog output carry no ANSI colors. Syslog lines are
/// "LEVEL message"; the daemon adds time and program name.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let filter = build_filter(config, level_override)?;
    let destination = config.destination()?;

    let stdout_layer =
        matches!(destination, LogDestination::Stdout).then(tracing_subscriber::fmt::layer);

    let file_layer = match destination {
        LogDestination::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        _ => None,
    };

    let syslog_layer = match destination {
        LogDestination::Syslog => Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_target(false)
                .with_writer(syslog_writer()?),
        ),
        _ => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .with(syslog_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {}", e)))
}

#[cfg(unix)]
fn syslog_writer() -> Result<syslog_tracing::Syslog> {
    let (options, facility) = Default::default();
    syslog_tracing::Syslog::new(SYSLOG_IDENTITY, options, facility)
        .ok_or_else(|| Error::Config("syslog connection already in use".to_string()))
}

#[cfg(not(unix))]
fn syslog_writer() -> Result<fn() -> std::io::Stdout> {
    Err(Error::Config(
        "logging.output = \"syslog\" is only supported on Unix".to_string(),
    ))
}
