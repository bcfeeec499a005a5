//! Session manager for account authentication

use std::sync::Arc;

use chrono::{DateTime, Utc};
use circle_api::models::LoginRequest;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

use crate::authn::session::{Session, SESSION_COOKIE};
use crate::errors::{CircleError, Result};
use crate::http::client::HttpClient;
use crate::storage::session::SessionStore;

/// What the caller authenticates with
#[derive(Debug)]
pub enum Credentials {
    /// Account email and password, exchanged for a session cookie
    Password {
        email: String,
        password: SecretString,
    },

    /// Pre-issued token used as-is
    Token(SecretString),
}

impl Credentials {
    /// Build password credentials
    pub fn password(email: impl Into<String>, password: impl Into<String>) -> Self {
        let password: String = password.into();
        Credentials::Password {
            email: email.into(),
            password: SecretString::from(password),
        }
    }

    /// Build token credentials
    pub fn token(token: impl Into<String>) -> Self {
        let token: String = token.into();
        Credentials::Token(SecretString::from(token))
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Obtains usable sessions, reusing a cached one while it is still fresh
pub struct SessionManager {
    http_client: Arc<HttpClient>,
    clock: Clock,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(http_client: Arc<HttpClient>) -> Self {
        Self {
            http_client,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the clock used for freshness checks
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Get a session for `credentials`
    ///
    /// Token credentials become a non-expiring session without touching the
    /// store or the network. Password credentials reuse the stored session if
    /// it has not yet expired, and otherwise log in and store the result.
    pub async fn obtain_session(
        &self,
        credentials: Credentials,
        store: Option<&dyn SessionStore>,
    ) -> Result<Session> {
        let (email, password) = match credentials {
            Credentials::Token(token) => {
                if token.expose_secret().is_empty() {
                    return Err(CircleError::MissingCredentials(
                        "token is empty".to_string(),
                    ));
                }
                debug!("Using pre-issued token, skipping login");
                return Ok(Session::bearer(token));
            }
            Credentials::Password { email, password } => (email, password),
        };

        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(CircleError::MissingCredentials(
                "email and password are both required".to_string(),
            ));
        }

        if let Some(store) = store {
            match self.load_fresh(store).await {
                Ok(session) => {
                    info!(
                        "Reusing cached session, expires at: {}",
                        session.expiry().map(|e| e.to_rfc3339()).unwrap_or_default()
                    );
                    return Ok(session);
                }
                Err(CircleError::SessionExpired) => info!("Cached session has expired, logging in"),
                Err(e) => debug!("No usable cached session: {}", e),
            }
        }

        let session = self.login(&email, &password).await?;

        if let Some(store) = store {
            store.save(&session).await?;
            debug!("Session cached");
        }

        Ok(session)
    }

    /// Load the stored session and accept it only while it is unexpired
    pub async fn load_fresh(&self, store: &dyn SessionStore) -> Result<Session> {
        let session = store.load().await?;
        if session.is_bearer() {
            return Err(CircleError::SessionInvalid(
                "cached session is not a cookie session".to_string(),
            ));
        }

        match session.expiry() {
            None => Err(CircleError::SessionInvalid(
                "cached session has no expiry".to_string(),
            )),
            Some(expiry) if session.is_expired_at(self.now()) => {
                warn!("Cached session expired at {}", expiry);
                Err(CircleError::SessionExpired)
            }
            Some(_) => Ok(session),
        }
    }

    /// Exchange email and password for a session cookie
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session> {
        let url = self.http_client.api_url(&["accounts", "authorization"])?;
        info!("Logging in as {}", email);

        let body = LoginRequest {
            email: email.to_string(),
            password: password.expose_secret().to_string(),
        };
        let response = self.http_client.post_anonymous(&url, &body).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Login failed: {} - {}", status, body);
            return Err(CircleError::Authentication { status, body });
        }

        let now = self.now();
        let cookie = response
            .cookies()
            .find(|cookie| cookie.name() == SESSION_COOKIE && !cookie.value().is_empty())
            .map(|cookie| {
                let expiry = cookie
                    .expires()
                    .map(DateTime::<Utc>::from)
                    .or_else(|| {
                        cookie
                            .max_age()
                            .and_then(|age| chrono::Duration::from_std(age).ok())
                            .map(|age| now + age)
                    });
                (cookie.value().to_string(), expiry)
            });

        let Some((value, expiry)) = cookie else {
            error!("Login response carried no {} cookie", SESSION_COOKIE);
            return Err(CircleError::Authentication {
                status,
                body: format!("response did not set the {} cookie", SESSION_COOKIE),
            });
        };

        match expiry {
            Some(expiry) => info!("Logged in, session expires at: {}", expiry),
            None => info!("Logged in, session expiry not provided"),
        }

        Ok(Session::from_cookie(value, expiry))
    }
}
