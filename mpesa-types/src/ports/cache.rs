//! Token cache port.

use std::time::Duration;

/// Key-value store with per-entry expiry, used to avoid redundant
/// token-issuance calls.
#[async_trait::async_trait]
pub trait TokenCache: Send + Sync + 'static {
    /// Returns the live value for `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration);

    /// Removes `key`. Removing an absent key is not an error.
    async fn forget(&self, key: &str);
}
