//! Generic key-value storage configuration.

use serde::{Deserialize, Serialize};

use crate::traits::StorageBackend;

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which adapter backs the storage manager.
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Namespace prefix for every key (`prefix:key`).
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Default time-to-live for entries in milliseconds; unset means no expiry.
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Encode/decode strategy applied to serialized envelopes.
    #[serde(default)]
    pub codec: CodecKind,
    /// Max-age used by the cookie adapter for generic values, in seconds.
    #[serde(default = "default_cookie_max_age")]
    pub cookie_max_age_seconds: u64,
    /// Interval for the optional expired-entry sweeper; unset disables it.
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,
    /// Origin store settings.
    #[serde(default)]
    pub origin: OriginStoreConfig,
    /// Transactional database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            prefix: default_prefix(),
            ttl_ms: None,
            codec: CodecKind::default(),
            cookie_max_age_seconds: default_cookie_max_age(),
            sweep_interval_seconds: None,
            origin: OriginStoreConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

/// Value codec selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    /// Store envelopes as plain JSON.
    #[default]
    Identity,
    /// Store envelopes base64-encoded.
    Base64,
}

/// Origin-scoped key-value store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginStoreConfig {
    /// Store implementation.
    #[serde(default)]
    pub kind: OriginStoreKind,
    /// Backing file for the `file` kind.
    #[serde(default = "default_origin_path")]
    pub path: String,
    /// Maximum total size of keys and values in bytes.
    #[serde(default = "default_quota")]
    pub quota_bytes: Option<u64>,
}

impl Default for OriginStoreConfig {
    fn default() -> Self {
        Self {
            kind: OriginStoreKind::default(),
            path: default_origin_path(),
            quota_bytes: default_quota(),
        }
    }
}

/// Origin store implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OriginStoreKind {
    /// Process-local map.
    #[default]
    Memory,
    /// JSON file on disk.
    File,
}

/// Transactional database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database implementation.
    #[serde(default)]
    pub kind: DatabaseKind,
    /// Database name.
    #[serde(default = "default_database_name")]
    pub name: String,
    /// Object store name inside the database.
    #[serde(default = "default_store_name")]
    pub store: String,
    /// Redis connection URL for the `redis` kind.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::default(),
            name: default_database_name(),
            store: default_store_name(),
            redis_url: default_redis_url(),
        }
    }
}

/// Transactional database implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseKind {
    /// Process-local databases.
    #[default]
    Memory,
    /// Redis hashes with MULTI/EXEC transactions.
    Redis,
}

fn default_backend() -> StorageBackend {
    StorageBackend::Origin
}

fn default_prefix() -> String {
    "app".to_string()
}

fn default_cookie_max_age() -> u64 {
    60 * 60 * 24 * 365
}

fn default_origin_path() -> String {
    "data/origin.json".to_string()
}

fn default_quota() -> Option<u64> {
    Some(5 * 1024 * 1024)
}

fn default_database_name() -> String {
    "authstash".to_string()
}

fn default_store_name() -> String {
    "keyval".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
