//! Uniform key-value contract shared by every persistence backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies which backend an adapter wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Synchronous cookie jar.
    Cookie,
    /// Synchronous origin-scoped key-value store.
    Origin,
    /// Asynchronous transactional database.
    Transactional,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Cookie => write!(f, "cookie"),
            StorageBackend::Origin => write!(f, "origin"),
            StorageBackend::Transactional => write!(f, "transactional"),
        }
    }
}

/// Trait for string key-value adapters (cookie, origin, transactional).
///
/// Values are plain strings; serialization is the caller's concern.
/// Implementations never surface backend failures: a failed read yields
/// `None`, a failed write completes silently, and a failed enumeration
/// yields an empty list. Each failure is logged at `warn`.
#[async_trait]
pub trait StorageAdapter: Send + Sync + std::fmt::Debug + 'static {
    /// The backend this adapter wraps.
    fn backend(&self) -> StorageBackend;

    /// Get a value by key. Returns `None` if absent or unreadable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store a value under a key, replacing any previous value.
    async fn set(&self, key: &str, value: &str);

    /// Remove a key.
    async fn remove(&self, key: &str);

    /// Remove every key the adapter owns, regardless of namespace.
    async fn clear(&self);

    /// List every key the adapter currently holds.
    async fn keys(&self) -> Vec<String>;
}
