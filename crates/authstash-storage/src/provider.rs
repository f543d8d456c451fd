//! Storage provider that dispatches to the configured adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use authstash_core::config::{CookieConfig, DatabaseKind, OriginStoreKind, StorageConfig};
use authstash_core::result::AppResult;
use authstash_core::traits::{
    Clock, CookieJar, DatabaseFactory, OriginStore, StorageAdapter, StorageBackend,
};

use crate::adapters::{CookieStorageAdapter, OriginStorageAdapter, TransactionalStorageAdapter};
use crate::cookie::{CookieManager, MemoryCookieJar};
use crate::database::MemoryDatabaseFactory;
use crate::origin::{FileOriginStore, MemoryOriginStore};

/// Storage provider that wraps the configured adapter.
///
/// The adapter is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StorageProvider {
    /// The inner adapter.
    inner: Arc<dyn StorageAdapter>,
}

impl StorageProvider {
    /// Create a provider from configuration.
    ///
    /// The cookie backend uses a process-local jar. No connection is made
    /// for the transactional backend until the first operation.
    pub fn from_config(
        storage: &StorageConfig,
        cookie: &CookieConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let inner: Arc<dyn StorageAdapter> = match storage.backend {
            StorageBackend::Cookie => {
                info!("Initializing cookie storage adapter");
                let jar: Arc<dyn CookieJar> = Arc::new(MemoryCookieJar::new(clock));
                let cookies = CookieManager::new(jar, cookie.clone());
                Arc::new(CookieStorageAdapter::new(
                    cookies,
                    storage.cookie_max_age_seconds,
                ))
            }
            StorageBackend::Origin => {
                info!(kind = ?storage.origin.kind, "Initializing origin storage adapter");
                Arc::new(OriginStorageAdapter::new(origin_store(storage)?))
            }
            StorageBackend::Transactional => {
                info!(
                    kind = ?storage.database.kind,
                    database = %storage.database.name,
                    store = %storage.database.store,
                    "Initializing transactional storage adapter"
                );
                Arc::new(TransactionalStorageAdapter::new(
                    database_factory(storage)?,
                    storage.database.name.clone(),
                    storage.database.store.clone(),
                ))
            }
        };

        Ok(Self { inner })
    }

    /// Create a provider from an existing adapter (for testing).
    pub fn from_adapter(adapter: Arc<dyn StorageAdapter>) -> Self {
        Self { inner: adapter }
    }

    /// Get a reference to the inner adapter.
    pub fn adapter(&self) -> &dyn StorageAdapter {
        self.inner.as_ref()
    }
}

/// Build the configured origin store.
pub fn origin_store(storage: &StorageConfig) -> AppResult<Arc<dyn OriginStore>> {
    let origin = &storage.origin;
    let store: Arc<dyn OriginStore> = match origin.kind {
        OriginStoreKind::Memory => Arc::new(MemoryOriginStore::with_quota(origin.quota_bytes)),
        OriginStoreKind::File => Arc::new(FileOriginStore::open(&origin.path, origin.quota_bytes)?),
    };
    Ok(store)
}

/// Build the configured database factory.
pub fn database_factory(storage: &StorageConfig) -> AppResult<Arc<dyn DatabaseFactory>> {
    let factory: Arc<dyn DatabaseFactory> = match storage.database.kind {
        DatabaseKind::Memory => Arc::new(MemoryDatabaseFactory::new()),
        #[cfg(feature = "redis-backend")]
        DatabaseKind::Redis => Arc::new(crate::database::RedisDatabaseFactory::new(
            &storage.database.redis_url,
        )?),
        #[cfg(not(feature = "redis-backend"))]
        DatabaseKind::Redis => {
            return Err(authstash_core::error::AppError::configuration(
                "Redis database requested but the redis-backend feature is disabled",
            ));
        }
    };
    Ok(factory)
}

#[async_trait]
impl StorageAdapter for StorageProvider {
    fn backend(&self) -> StorageBackend {
        self.inner.backend()
    }

    async fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) {
        self.inner.remove(key).await
    }

    async fn clear(&self) {
        self.inner.clear().await
    }

    async fn keys(&self) -> Vec<String> {
        self.inner.keys().await
    }
}
