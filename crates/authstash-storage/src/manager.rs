//! Namespaced, typed storage with TTL envelopes over any adapter.

use std::sync::Arc;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use authstash_core::config::StorageConfig;
use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::{Clock, StorageAdapter};

use crate::codec::{IdentityCodec, ValueCodec, codec_for};

/// A stored value with its write time and optional lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The caller's value.
    pub value: T,
    /// Write time in epoch milliseconds.
    pub timestamp: i64,
    /// Lifetime in milliseconds; absent means the entry never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
}

impl<T> Envelope<T> {
    /// Whether the entry is past its lifetime at `now_ms`.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.ttl {
            Some(ttl) => {
                let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
                now_ms > self.timestamp.saturating_add(ttl)
            }
            None => false,
        }
    }
}

/// Storage manager settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageManagerConfig {
    /// Namespace prepended to every key as `prefix:key`.
    pub prefix: String,
    /// Default lifetime for new entries in milliseconds.
    pub ttl_ms: Option<u64>,
}

impl Default for StorageManagerConfig {
    fn default() -> Self {
        Self {
            prefix: "app".to_string(),
            ttl_ms: None,
        }
    }
}

impl From<&StorageConfig> for StorageManagerConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            ttl_ms: config.ttl_ms,
        }
    }
}

/// Typed key-value storage over a [`StorageAdapter`].
///
/// Values are wrapped in an [`Envelope`], serialized to JSON and passed
/// through a [`ValueCodec`]. Expired entries are removed when read.
/// Nothing here returns an error: unreadable entries are absent and
/// failed writes are logged.
#[derive(Debug, Clone)]
pub struct StorageManager {
    adapter: Arc<dyn StorageAdapter>,
    codec: Arc<dyn ValueCodec>,
    clock: Arc<dyn Clock>,
    config: StorageManagerConfig,
}

impl StorageManager {
    /// Create a manager storing plain JSON envelopes.
    pub fn new(
        adapter: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: StorageManagerConfig,
    ) -> Self {
        Self {
            adapter,
            codec: Arc::new(IdentityCodec),
            clock,
            config,
        }
    }

    /// Create a manager from storage configuration.
    pub fn from_config(
        adapter: Arc<dyn StorageAdapter>,
        clock: Arc<dyn Clock>,
        config: &StorageConfig,
    ) -> Self {
        Self::new(adapter, clock, config.into()).with_codec(codec_for(config.codec))
    }

    /// Replace the value codec.
    pub fn with_codec(mut self, codec: Arc<dyn ValueCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &Arc<dyn StorageAdapter> {
        &self.adapter
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.config.prefix)
    }

    fn decode<T: DeserializeOwned>(&self, stored: &str) -> AppResult<Envelope<T>> {
        let json = self.codec.decode(stored)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read `key`, or `None` when absent, expired or unreadable.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let full_key = self.full_key(key);
        let stored = self.adapter.get(&full_key).await?;

        let envelope: Envelope<T> = match self.decode(&stored) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = %full_key, codec = self.codec.name(), error = %e, "Unreadable storage entry");
                return None;
            }
        };

        if envelope.is_expired(self.clock.now_ms()) {
            debug!(key = %full_key, "Entry expired, removing");
            self.adapter.remove(&full_key).await;
            return None;
        }

        Some(envelope.value)
    }

    /// Write `key` with the configured default lifetime.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.config.ttl_ms).await;
    }

    /// Write `key` with an explicit lifetime; `None` never expires.
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_ms: Option<u64>,
    ) {
        let full_key = self.full_key(key);
        let envelope = Envelope {
            value,
            timestamp: self.clock.now_ms(),
            ttl: ttl_ms,
        };

        let encoded = serde_json::to_string(&envelope)
            .map_err(AppError::from)
            .and_then(|json| self.codec.encode(&json));
        match encoded {
            Ok(payload) => self.adapter.set(&full_key, &payload).await,
            Err(e) => warn!(key = %full_key, error = %e, "Failed to encode value, skipping write"),
        }
    }

    /// Remove `key`.
    pub async fn remove(&self, key: &str) {
        self.adapter.remove(&self.full_key(key)).await;
    }

    /// Remove every key the adapter holds, in any namespace.
    pub async fn clear(&self) {
        self.adapter.clear().await;
    }

    /// Every key the adapter holds, unmodified.
    pub async fn keys(&self) -> Vec<String> {
        self.adapter.keys().await
    }

    /// Keys under this manager's prefix, with the prefix stripped.
    pub async fn namespaced_keys(&self) -> Vec<String> {
        let prefix = format!("{}:", self.config.prefix);
        self.adapter
            .keys()
            .await
            .into_iter()
            .filter_map(|k| k.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    /// Remove only the keys under this manager's prefix.
    pub async fn clear_namespace(&self) {
        for key in self.namespaced_keys().await {
            self.remove(&key).await;
        }
    }

    /// Remove expired and unreadable entries under this prefix.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut removed = 0;

        for key in self.namespaced_keys().await {
            let full_key = self.full_key(&key);
            let Some(stored) = self.adapter.get(&full_key).await else {
                continue;
            };
            let stale = match self.decode::<IgnoredAny>(&stored) {
                Ok(envelope) => envelope.is_expired(now),
                Err(_) => true,
            };
            if stale {
                self.adapter.remove(&full_key).await;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(prefix = %self.config.prefix, removed, "Purged stale entries");
        }
        removed
    }
}
