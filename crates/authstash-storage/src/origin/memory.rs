//! In-memory origin store using dashmap.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::OriginStore;

use super::{check_quota, item_size};

/// Process-local origin store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryOriginStore {
    items: DashMap<String, String>,
    quota_bytes: Option<u64>,
    disabled: AtomicBool,
}

impl MemoryOriginStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: Option<u64>) -> Self {
        Self {
            quota_bytes,
            ..Self::default()
        }
    }

    /// Simulate the store being blocked (e.g. private browsing).
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn ensure_enabled(&self) -> AppResult<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("Origin store is disabled"));
        }
        Ok(())
    }

    fn used_bytes_excluding(&self, key: &str) -> u64 {
        self.items
            .iter()
            .filter(|entry| entry.key() != key)
            .map(|entry| item_size(entry.key(), entry.value()))
            .sum()
    }
}

impl OriginStore for MemoryOriginStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        self.ensure_enabled()?;
        Ok(self.items.get(key).map(|v| v.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.ensure_enabled()?;
        if self.quota_bytes.is_some() {
            let used = self.used_bytes_excluding(key) + item_size(key, value);
            check_quota(used, self.quota_bytes)?;
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.ensure_enabled()?;
        self.items.remove(key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.ensure_enabled()?;
        self.items.clear();
        Ok(())
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        self.ensure_enabled()?;
        let mut keys: Vec<String> = self.items.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authstash_core::error::ErrorKind;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryOriginStore::new();
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
        store.remove_item("k").unwrap();
    }

    #[test]
    fn test_keys_sorted_and_clear() {
        let store = MemoryOriginStore::new();
        store.set_item("b", "2").unwrap();
        store.set_item("a", "1").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);
        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_quota_exceeded() {
        // "k" + "12345" = 6 code units = 12 bytes
        let store = MemoryOriginStore::with_quota(Some(12));
        store.set_item("k", "12345").unwrap();
        // replacing the same key does not double count
        store.set_item("k", "54321").unwrap();
        let err = store.set_item("x", "1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::QuotaExceeded);
        assert_eq!(store.get_item("x").unwrap(), None);
    }

    #[test]
    fn test_disabled_store_fails() {
        let store = MemoryOriginStore::new();
        store.set_item("k", "v").unwrap();
        store.set_disabled(true);
        assert_eq!(store.get_item("k").unwrap_err().kind, ErrorKind::Unavailable);
        assert!(store.set_item("k", "w").is_err());
        store.set_disabled(false);
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));
    }
}
