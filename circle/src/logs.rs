//! Logging configuration

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::CircleError;

/// Verbosity named in the settings file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Log level, unless `RUST_LOG` says otherwise
    pub log_level: LogLevel,

    /// Emit JSON lines instead of human-readable text
    pub json_format: bool,
}

/// Initialize logging
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(options: LogOptions) -> Result<(), CircleError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(options.log_level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(filter);

    if options.json_format {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| CircleError::Config(e.to_string()))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| CircleError::Config(e.to_string()))?;
    }

    Ok(())
}
