//! playsync-importer - one-shot detection log import
//!
//! Meant to be started periodically by an external scheduler (cron, systemd
//! timer). Each run imports every day from the destination's latest play up
//! to today and exits; a failed run is resumed by the next one.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use playsync_common::config::{resolve_config_path, Settings};
use playsync_common::{logging, time};
use playsync_importer::services::{AcrClient, RaarClient};
use playsync_importer::{ImportOptions, ImportSummary, Importer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Command-line arguments for playsync-importer
#[derive(Parser, Debug)]
#[command(name = "playsync-importer")]
#[command(about = "Import detected track plays into the play-history store")]
#[command(version)]
struct Args {
    /// Settings file, falls back to the default locations
    #[arg(short, long, env = "PLAYSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log level or filter directive, overrides the settings file
    #[arg(long, env = "PLAYSYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Last date to import (YYYY-MM-DD), defaults to today (UTC)
    #[arg(long, env = "PLAYSYNC_UNTIL")]
    until: Option<NaiveDate>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is configured by the settings, so it is not up yet
            eprintln!("playsync-importer: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&settings.logging, args.log_level.as_deref()) {
        eprintln!("playsync-importer: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(&args, &settings).await {
        Ok(summary) => {
            info!(
                days = summary.days.len(),
                submitted = summary.total_submitted(),
                "Import finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Import aborted: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings> {
    let path = resolve_config_path(args.config.as_deref())?;
    Settings::load(&path).with_context(|| format!("Failed to load {}", path.display()))
}

async fn run(args: &Args, settings: &Settings) -> Result<ImportSummary> {
    info!("Starting playsync-importer {}", env!("CARGO_PKG_VERSION"));

    let until = args.until.unwrap_or_else(time::today);
    let options = ImportOptions::from_settings(&settings.importer, until)?;

    let source = AcrClient::new(&settings.acr).context("Failed to create source client")?;
    let destination = RaarClient::connect(&settings.raar)
        .await
        .context("Failed to connect to play store")?;

    let importer = Importer::new(source, destination, options);
    Ok(importer.run().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_test::serial;

    const ENV_VARS: [&str; 3] = ["PLAYSYNC_CONFIG", "PLAYSYNC_LOG_LEVEL", "PLAYSYNC_UNTIL"];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    #[serial]
    fn test_flags_parsed() {
        clear_env();
        let args = Args::try_parse_from([
            "playsync-importer",
            "--config",
            "/tmp/playsync.toml",
            "--log-level",
            "debug",
            "--until",
            "2024-03-05",
        ])
        .unwrap();

        assert_eq!(args.config, Some(PathBuf::from("/tmp/playsync.toml")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.until, NaiveDate::from_ymd_opt(2024, 3, 5));
    }

    #[test]
    #[serial]
    fn test_env_fallbacks() {
        clear_env();
        std::env::set_var("PLAYSYNC_CONFIG", "/etc/playsync/alt.toml");
        std::env::set_var("PLAYSYNC_LOG_LEVEL", "warn");
        std::env::set_var("PLAYSYNC_UNTIL", "2023-12-31");

        let args = Args::try_parse_from(["playsync-importer"]).unwrap();
        clear_env();

        assert_eq!(args.config, Some(PathBuf::from("/etc/playsync/alt.toml")));
        assert_eq!(args.log_level.as_deref(), Some("warn"));
        assert_eq!(args.until, NaiveDate::from_ymd_opt(2023, 12, 31));
    }

    #[test]
    #[serial]
    fn test_flag_beats_env() {
        clear_env();
        std::env::set_var("PLAYSYNC_UNTIL", "2023-12-31");

        let args = Args::try_parse_from(["playsync-importer", "--until", "2024-01-02"]).unwrap();
        clear_env();

        assert_eq!(args.until, NaiveDate::from_ymd_opt(2024, 1, 2));
    }

    #[test]
    #[serial]
    fn test_invalid_until_rejected() {
        clear_env();
        assert!(Args::try_parse_from(["playsync-importer", "--until", "05.03.2024"]).is_err());
    }

    #[test]
    #[serial]
    fn test_defaults_without_flags_or_env() {
        clear_env();
        let args = Args::try_parse_from(["playsync-importer"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.log_level.is_none());
        assert!(args.until.is_none());
    }
}
