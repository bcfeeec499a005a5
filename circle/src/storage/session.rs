//! Session cache persistence

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use circle_api::models::CachedSession;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::authn::session::Session;
use crate::errors::{CircleError, Result};

/// Somewhere a session can be kept between runs
///
/// Access is assumed to come from a single process at a time; nothing here
/// locks against another process writing the same store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the stored session
    async fn load(&self) -> Result<Session>;

    /// Store a session, replacing any previous one
    async fn save(&self, session: &Session) -> Result<()>;
}

/// Session store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the cache file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn cache_error(&self, action: &str, err: impl std::fmt::Display) -> CircleError {
        CircleError::SessionCache(format!(
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            err
        ))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CircleError::SessionInvalid(format!(
                    "no session cached at {}",
                    self.path.display()
                )));
            }
            Err(e) => return Err(self.cache_error("read", e)),
        };

        let cached: CachedSession = serde_json::from_str(&contents).map_err(|e| {
            CircleError::SessionInvalid(format!(
                "malformed session cache {}: {}",
                self.path.display(),
                e
            ))
        })?;

        if cached.credential.is_empty() {
            return Err(CircleError::SessionInvalid(format!(
                "session cache {} holds an empty credential",
                self.path.display()
            )));
        }

        debug!("Loaded cached session from {}", self.path.display());
        Ok(Session::from_cached(cached))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let Some(cached) = session.to_cached() else {
            debug!("Not caching a token session");
            return Ok(());
        };

        let contents = serde_json::to_vec_pretty(&cached)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.cache_error("create directory for", e))?;
            }
        }

        // Write a sibling temp file, then rename over the cache
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| self.cache_error("create", e))?;
        file.write_all(&contents)
            .await
            .map_err(|e| self.cache_error("write", e))?;
        file.sync_all()
            .await
            .map_err(|e| self.cache_error("sync", e))?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.cache_error("restrict permissions of", e))?;
        }

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.cache_error("replace", e))?;

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use secrecy::SecretString;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        let expiry = Utc::now() + Duration::days(7);

        store
            .save(&Session::from_cookie("cookie-value", Some(expiry)))
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        let cached = loaded.to_cached().unwrap();
        assert_eq!(cached.credential, "cookie-value");
        assert_eq!(cached.expiry.map(|e| e.timestamp()), Some(expiry.timestamp()));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent.json"));
        assert!(matches!(
            store.load().await,
            Err(CircleError::SessionInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(
            store.load().await,
            Err(CircleError::SessionInvalid(_))
        ));
    }

    #[tokio::test]
    async fn test_token_session_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store
            .save(&Session::bearer(SecretString::from("token".to_string())))
            .await
            .unwrap();
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store
            .save(&Session::from_cookie("v", Some(Utc::now())))
            .await
            .unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
