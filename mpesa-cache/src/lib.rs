//! # M-Pesa Cache
//!
//! [`TokenCache`] adapters. Entries expire after the TTL given at insertion;
//! expired entries are dropped lazily on read.
//!
//! - [`MemoryTokenCache`] - process-local, for long-running services
//! - [`FileTokenCache`] - a JSON file, for callers that exit between calls

mod file;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use mpesa_types::TokenCache;

pub use file::FileTokenCache;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// DashMap-backed token cache with per-entry expiry.
#[derive(Default)]
pub struct MemoryTokenCache {
    entries: DashMap<String, Entry>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
            tracing::debug!(key, "Token cache entry expired");
        }
        None
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn forget(&self, key: &str) {
        self.entries.remove(key);
    }
}
