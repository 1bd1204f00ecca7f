//! Device-local key-value store.
//!
//! Everything the reader persists (bundles, read flags, meta markers) lives
//! behind [`KvStore`], so the cache layers can be exercised against an
//! in-memory fake and run against SQLite in production. Every operation may
//! fail (disabled storage, quota, closed connection); callers degrade rather
//! than propagate.

pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors from a key-value store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// Storage is disabled or over quota.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<crate::Error> for StoreError {
    fn from(err: crate::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// String key-value store with key enumeration.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, overwriting silently.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Enumerate every key currently stored.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Enumerate keys starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .keys()
            .await?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}
