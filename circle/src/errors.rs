//! Error types for the Circle client

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Circle client
#[derive(Error, Debug)]
pub enum CircleError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Authentication failed: {status} - {body}")]
    Authentication { status: StatusCode, body: String },

    #[error("Cached session has expired")]
    SessionExpired,

    #[error("Cached session is invalid: {0}")]
    SessionInvalid(String),

    #[error("Session cache error: {0}")]
    SessionCache(String),

    #[error("Not found: {url} ({status})")]
    NotFound { url: String, status: StatusCode },

    #[error("Unexpected status from {url}: {status} - {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid activity id {0:?}")]
    InvalidActivityId(String),

    #[error("Accessory {0} has no node ID")]
    MissingNodeId(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CircleError {
    /// Wrap a reqwest failure with the URL it was issued against
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        CircleError::Transport {
            url: url.into(),
            source,
        }
    }

    /// Wrap a JSON decoding failure with the URL the payload came from
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        CircleError::Decode {
            url: url.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CircleError>;
