//! Authenticated session

use chrono::{DateTime, Utc};
use circle_api::models::CachedSession;
use secrecy::{ExposeSecret, SecretString};

/// Name of the cookie carrying the session credential
pub const SESSION_COOKIE: &str = "prod_session";

/// How a session authenticates its requests
#[derive(Debug)]
pub enum Credential {
    /// Value of the `prod_session` cookie obtained from a login
    Cookie(SecretString),

    /// Pre-issued token sent verbatim in the `authorization` header
    Bearer(SecretString),
}

/// One authenticated identity for the Circle API
#[derive(Debug)]
pub struct Session {
    credential: Credential,
    expiry: Option<DateTime<Utc>>,
}

impl Session {
    /// Create a cookie session from a login response
    pub fn from_cookie(value: impl Into<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            credential: Credential::Cookie(SecretString::from(value.into())),
            expiry,
        }
    }

    /// Create a session from a pre-issued token. It never expires.
    pub fn bearer(token: SecretString) -> Self {
        Self {
            credential: Credential::Bearer(token),
            expiry: None,
        }
    }

    /// Get the credential
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Get the expiry, if tracked
    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// Whether the session can no longer be used at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expiry, Some(expiry) if expiry <= now)
    }

    /// Whether this is a bearer-token session
    pub fn is_bearer(&self) -> bool {
        matches!(self.credential, Credential::Bearer(_))
    }

    /// Cache payload for this session. Bearer sessions are never cached.
    pub fn to_cached(&self) -> Option<CachedSession> {
        match &self.credential {
            Credential::Cookie(value) => Some(CachedSession {
                credential: value.expose_secret().to_string(),
                expiry: self.expiry,
            }),
            Credential::Bearer(_) => None,
        }
    }

    /// Rebuild a cookie session from a cache payload
    pub fn from_cached(cached: CachedSession) -> Self {
        Self::from_cookie(cached.credential, cached.expiry)
    }
}
