//! Adapter over the cookie channel.

use async_trait::async_trait;

use authstash_core::traits::{StorageAdapter, StorageBackend};

use super::recover;
use crate::cookie::{CookieManager, CookieOptions};

/// [`StorageAdapter`] that stores each key as one cookie.
#[derive(Debug, Clone)]
pub struct CookieStorageAdapter {
    cookies: CookieManager,
    max_age_seconds: i64,
}

impl CookieStorageAdapter {
    /// Store values as cookies living for `max_age_seconds`.
    pub fn new(cookies: CookieManager, max_age_seconds: u64) -> Self {
        Self {
            cookies,
            max_age_seconds: i64::try_from(max_age_seconds).unwrap_or(i64::MAX),
        }
    }
}

#[async_trait]
impl StorageAdapter for CookieStorageAdapter {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Cookie
    }

    async fn get(&self, key: &str) -> Option<String> {
        recover(self.backend(), "get", Some(key), self.cookies.get_cookie(key))
    }

    async fn set(&self, key: &str, value: &str) {
        let result =
            self.cookies
                .set_cookie(key, value, self.max_age_seconds, &CookieOptions::default());
        recover(self.backend(), "set", Some(key), result)
    }

    async fn remove(&self, key: &str) {
        recover(self.backend(), "remove", Some(key), self.cookies.delete_cookie(key))
    }

    async fn clear(&self) {
        let names = recover(self.backend(), "clear", None, self.cookies.cookie_names());
        for name in names {
            recover(
                self.backend(),
                "clear",
                Some(&name),
                self.cookies.delete_cookie(&name),
            );
        }
    }

    async fn keys(&self) -> Vec<String> {
        recover(self.backend(), "keys", None, self.cookies.cookie_names())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cookie::MemoryCookieJar;
    use authstash_core::config::CookieConfig;
    use authstash_core::traits::ManualClock;

    #[tokio::test]
    async fn test_values_expire_with_max_age() {
        let clock = Arc::new(ManualClock::new(0));
        let jar = Arc::new(MemoryCookieJar::new(clock.clone()));
        let adapter =
            CookieStorageAdapter::new(CookieManager::new(jar, CookieConfig::default()), 10);
        adapter.set("k", "v").await;
        clock.advance(10_000);
        assert_eq!(adapter.get("k").await, None);
    }

    #[tokio::test]
    async fn test_disabled_jar_degrades() {
        let clock = Arc::new(ManualClock::new(0));
        let jar = Arc::new(MemoryCookieJar::new(clock));
        let adapter = CookieStorageAdapter::new(
            CookieManager::new(jar.clone(), CookieConfig::default()),
            60,
        );
        jar.set_disabled(true);
        adapter.set("k", "v").await;
        assert_eq!(adapter.get("k").await, None);
        assert!(adapter.keys().await.is_empty());
    }
}
