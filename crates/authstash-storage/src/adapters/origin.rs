//! Adapter over an origin-scoped key-value store.

use std::sync::Arc;

use async_trait::async_trait;

use authstash_core::traits::{OriginStore, StorageAdapter, StorageBackend};

use super::recover;

/// [`StorageAdapter`] over an [`OriginStore`].
#[derive(Debug, Clone)]
pub struct OriginStorageAdapter {
    store: Arc<dyn OriginStore>,
}

impl OriginStorageAdapter {
    /// Wrap an origin store.
    pub fn new(store: Arc<dyn OriginStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StorageAdapter for OriginStorageAdapter {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Origin
    }

    async fn get(&self, key: &str) -> Option<String> {
        recover(self.backend(), "get", Some(key), self.store.get_item(key))
    }

    async fn set(&self, key: &str, value: &str) {
        recover(self.backend(), "set", Some(key), self.store.set_item(key, value))
    }

    async fn remove(&self, key: &str) {
        recover(self.backend(), "remove", Some(key), self.store.remove_item(key))
    }

    async fn clear(&self) {
        recover(self.backend(), "clear", None, self.store.clear())
    }

    async fn keys(&self) -> Vec<String> {
        recover(self.backend(), "keys", None, self.store.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::MemoryOriginStore;

    #[tokio::test]
    async fn test_quota_failure_is_silent() {
        let store = Arc::new(MemoryOriginStore::with_quota(Some(4)));
        let adapter = OriginStorageAdapter::new(store);
        adapter.set("key", "a long value").await;
        assert_eq!(adapter.get("key").await, None);
    }

    #[tokio::test]
    async fn test_disabled_store_degrades() {
        let store = Arc::new(MemoryOriginStore::new());
        let adapter = OriginStorageAdapter::new(store.clone());
        adapter.set("k", "v").await;
        store.set_disabled(true);
        assert_eq!(adapter.get("k").await, None);
        assert!(adapter.keys().await.is_empty());
        adapter.clear().await;
        store.set_disabled(false);
        assert_eq!(adapter.get("k").await, Some("v".to_string()));
    }
}
