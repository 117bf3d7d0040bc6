//! Credential storage trait and implementations

use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tokio::sync::RwLock;

/// How long a saved token stays valid, matching the API's 1-day cookie.
pub const TOKEN_TTL_SECS: u64 = 86_400;

const TOKEN_FILE_NAME: &str = "access_token.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: u64,
}

impl StoredToken {
    fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            expires_at: unix_now() + TOKEN_TTL_SECS,
        }
    }

    fn is_valid(&self) -> bool {
        self.expires_at > unix_now()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

/// Durable storage for the bearer token.
///
/// Absence is not an error: `load` returns `None` for a missing or expired
/// token, and `clear` is a no-op when nothing is stored.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist `token` with a fresh 1-day expiry.
    async fn save(&self, token: &str) -> Result<()>;

    /// The stored token, if present and unexpired.
    async fn load(&self) -> Option<String>;

    /// Remove any stored token. Idempotent.
    async fn clear(&self) -> Result<()>;
}

/// File-backed credential store, the cookie analog for non-browser clients.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Keeps the token as `access_token.json` under `base_dir`.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            path: base_dir.as_ref().join(TOKEN_FILE_NAME),
        }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string(&StoredToken::new(token))?;
        fs::write(&self.path, contents).await?;
        Ok(())
    }

    async fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).await.ok()?;
        let stored: StoredToken = serde_json::from_str(&contents).ok()?;
        if stored.is_valid() {
            Some(stored.token)
        } else {
            // Stale file, drop it so the next load is a plain miss.
            debug!("Stored token expired, removing {:?}", self.path);
            let _ = fs::remove_file(&self.path).await;
            None
        }
    }

    async fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

/// In-memory credential store for tests and embedders without a data dir.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<StoredToken>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(&self, token: &str) -> Result<()> {
        *self.slot.write().await = Some(StoredToken::new(token));
        Ok(())
    }

    async fn load(&self) -> Option<String> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(stored) if stored.is_valid() => Some(stored.token.clone()),
            _ => None,
        }
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.write().await = None;
        Ok(())
    }
}
