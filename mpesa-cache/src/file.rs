//! JSON-file [`TokenCache`] adapter.
//!
//! Entries survive the process, so short-lived callers such as the CLI can
//! reuse a token across runs and clear it later. Every operation reads and
//! rewrites the whole file under a lock; the file only ever holds a handful
//! of tokens.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use mpesa_types::TokenCache;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    value: String,
    /// Unix seconds.
    expires_at: i64,
}

type Entries = BTreeMap<String, StoredToken>;

/// Token cache persisted as a JSON object in a single file.
pub struct FileTokenCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenCache {
    /// Uses `path`; the file is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes every entry and returns how many live ones were dropped.
    pub async fn clear(&self) -> usize {
        let _guard = self.lock.lock().await;
        let now = Utc::now().timestamp();
        let live = self
            .load()
            .await
            .values()
            .filter(|token| token.expires_at > now)
            .count();
        self.store(&Entries::new()).await;
        live
    }

    /// Unreadable or corrupt files count as empty.
    async fn load(&self) -> Entries {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring corrupt token cache file");
                Entries::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Entries::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read token cache file");
                Entries::new()
            }
        }
    }

    async fn store(&self, entries: &Entries) {
        let bytes = match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode token cache");
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.path, bytes).await {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write token cache file");
        }
    }
}

#[async_trait]
impl TokenCache for FileTokenCache {
    async fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;
        match entries.get(key) {
            Some(token) if token.expires_at > Utc::now().timestamp() => Some(token.value.clone()),
            Some(_) => {
                entries.remove(key);
                self.store(&entries).await;
                tracing::debug!(key, "Token cache entry expired");
                None
            }
            None => None,
        }
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        entries.insert(
            key.to_string(),
            StoredToken {
                value,
                expires_at: Utc::now().timestamp().saturating_add(ttl),
            },
        );
        self.store(&entries).await;
    }

    async fn forget(&self, key: &str) {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await;
        if entries.remove(key).is_some() {
            self.store(&entries).await;
        }
    }
}
