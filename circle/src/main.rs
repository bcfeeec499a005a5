//! Circle - Entry Point
//!
//! Lists accessories, saves live snapshots and downloads recorded activity
//! videos from the Logitech Circle camera service.

use std::process::ExitCode;
use std::time::Duration;

use circle::app::options::ClientOptions;
use circle::app::run::run;
use circle::cli::Cli;
use circle::logs::{init_logging, LogLevel, LogOptions};
use circle::storage::settings::Settings;
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Retrieve the settings file
    let settings = match &cli.settings {
        Some(path) => match Settings::load(path).await {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: if cli.debug {
            LogLevel::Debug
        } else {
            settings.log_level
        },
        json_format: cli.json_logs,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let options = ClientOptions {
        base_url: cli
            .base_url
            .clone()
            .unwrap_or_else(|| settings.base_url.clone()),
        timeout: Duration::from_secs(settings.timeout_secs),
        ..Default::default()
    };

    match run(&cli, &settings, options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
