//! Command-line interface definition
//!
//! Credentials and paths can come from flags or `CIRCLE_*` environment
//! variables; every flag is accepted before or after the subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::authn::session_mngr::Credentials;
use crate::errors::{CircleError, Result};

/// Download recordings and snapshots from Logitech Circle cameras
#[derive(Parser, Debug, Clone)]
#[command(name = "circle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Account email address
    #[arg(long, env = "CIRCLE_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "CIRCLE_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Pre-issued API token; skips the login entirely
    #[arg(long, env = "CIRCLE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// File used to keep the login session between runs
    #[arg(long, env = "CIRCLE_SESSION_CACHE", global = true)]
    pub session_cache: Option<PathBuf>,

    /// Path to a JSON settings file
    #[arg(long, env = "CIRCLE_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, env = "CIRCLE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the accessories on the account
    Accessories {
        /// Print JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },

    /// Save a live image from an accessory
    Snapshot {
        /// Accessory to capture from
        accessory_id: String,

        /// Where to save the image (default: <unix-seconds>.jpeg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the videos recorded by an accessory within a time range
    Download {
        /// Accessory whose activities to download
        accessory_id: String,

        /// Start of the range, e.g. "Jan 02 2006 15:04:05"
        #[arg(long)]
        begin: String,

        /// End of the range, same format as --begin
        #[arg(long, conflicts_with = "duration", required_unless_present = "duration")]
        end: Option<String>,

        /// Length of the range from --begin, e.g. 1h, 5m10s
        #[arg(long)]
        duration: Option<String>,

        /// Zone of --begin/--end: local, utc, or an offset like -08:00
        #[arg(long)]
        tz: Option<String>,

        /// Directory the videos are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

impl Cli {
    /// Pick the credentials to authenticate with. A token wins over a password.
    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::token(token));
        }

        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok(Credentials::password(email, password))
            }
            _ => Err(CircleError::MissingCredentials(
                "pass --token, or both --email and --password".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_download() {
        let cli = Cli::try_parse_from([
            "circle",
            "download",
            "cam-1",
            "--begin",
            "Jan 02 2024 15:04:05",
            "--duration",
            "1h",
            "--token",
            "abc",
        ])
        .unwrap();

        match cli.command {
            Commands::Download {
                accessory_id,
                begin,
                end,
                duration,
                ..
            } => {
                assert_eq!(accessory_id, "cam-1");
                assert_eq!(begin, "Jan 02 2024 15:04:05");
                assert!(end.is_none());
                assert_eq!(duration.as_deref(), Some("1h"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_download_needs_end_or_duration() {
        let result = Cli::try_parse_from(["circle", "download", "cam-1", "--begin", "x"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "circle", "download", "cam-1", "--begin", "x", "--end", "y", "--duration", "1h",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_token_preferred_over_password() {
        let cli = Cli::try_parse_from([
            "circle",
            "--email",
            "a@b.c",
            "--password",
            "pw",
            "--token",
            "tok",
            "accessories",
        ])
        .unwrap();
        assert!(matches!(cli.credentials(), Ok(Credentials::Token(_))));
    }

    #[test]
    fn test_password_credentials_need_both_parts() {
        let mut cli = Cli::try_parse_from(["circle", "accessories", "--email", "a@b.c"]).unwrap();
        // Ignore whatever CIRCLE_* variables the environment carries
        cli.password = None;
        cli.token = None;
        assert!(matches!(
            cli.credentials(),
            Err(CircleError::MissingCredentials(_))
        ));

        cli.password = Some(String::new());
        assert!(matches!(
            cli.credentials(),
            Err(CircleError::MissingCredentials(_))
        ));

        cli.password = Some("pw".to_string());
        assert!(matches!(
            cli.credentials(),
            Ok(Credentials::Password { ref email, .. }) if email == "a@b.c"
        ));
    }
}
