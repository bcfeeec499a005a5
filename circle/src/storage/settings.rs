//! Settings file management

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::options::DEFAULT_BASE_URL;
use crate::errors::{CircleError, Result};
use crate::logs::LogLevel;

/// Settings read from an optional JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Base URL for the Circle API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where to cache the login session, if anywhere
    #[serde(default)]
    pub session_cache: Option<PathBuf>,

    /// Zone used to read and print activity times
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_time_zone() -> String {
    "local".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            base_url: default_base_url(),
            session_cache: None,
            time_zone: default_time_zone(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            CircleError::Config(format!("Unable to read settings file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            CircleError::Config(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"log_level":"debug"}"#).unwrap();
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.time_zone, "local");
        assert_eq!(settings.timeout_secs, 30);
        assert!(settings.session_cache.is_none());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let result: std::result::Result<Settings, _> =
            serde_json::from_str(r#"{"log_level":"loud"}"#);
        assert!(result.is_err());
    }
}
