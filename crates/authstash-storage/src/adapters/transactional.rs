//! Adapter over a transactional database.
//!
//! The database is opened on first use. Concurrent first uses share one
//! open; a failed open leaves the handle empty so the next operation
//! tries again. The database is opened at its stored version; when the
//! object store is missing from it, the version is bumped so the upgrade
//! creates the store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::{
    Database, DatabaseFactory, Schema, StorageAdapter, StorageBackend, TransactionMode,
};

use super::recover;

/// [`StorageAdapter`] storing every key in one object store.
#[derive(Debug)]
pub struct TransactionalStorageAdapter {
    factory: Arc<dyn DatabaseFactory>,
    db_name: String,
    store_name: String,
    handle: OnceCell<Arc<dyn Database>>,
}

impl TransactionalStorageAdapter {
    /// Create an adapter for `store_name` inside `db_name`. Nothing is opened yet.
    pub fn new(
        factory: Arc<dyn DatabaseFactory>,
        db_name: impl Into<String>,
        store_name: impl Into<String>,
    ) -> Self {
        Self {
            factory,
            db_name: db_name.into(),
            store_name: store_name.into(),
            handle: OnceCell::new(),
        }
    }

    /// Whether a database handle has been obtained.
    pub fn is_open(&self) -> bool {
        self.handle.initialized()
    }

    async fn database(&self) -> AppResult<&Arc<dyn Database>> {
        self.handle
            .get_or_try_init(|| async {
                let current = self.factory.version(&self.db_name).await?;
                let mut db = self.open_at(current.max(1)).await?;

                if !self.has_store(db.as_ref()) {
                    info!(
                        database = %self.db_name,
                        store = %self.store_name,
                        from = db.version(),
                        "Object store missing, upgrading database"
                    );
                    db = self.open_at(db.version().saturating_add(1)).await?;
                    if !self.has_store(db.as_ref()) {
                        return Err(AppError::transaction(format!(
                            "Object store '{}' was not created in '{}'",
                            self.store_name, self.db_name
                        )));
                    }
                }

                info!(
                    database = %self.db_name,
                    store = %self.store_name,
                    version = db.version(),
                    "Opened transactional database"
                );
                Ok::<_, AppError>(db)
            })
            .await
    }

    async fn open_at(&self, version: u32) -> AppResult<Arc<dyn Database>> {
        let schema = Schema {
            version,
            stores: vec![self.store_name.clone()],
        };
        self.factory.open(&self.db_name, &schema).await
    }

    fn has_store(&self, db: &dyn Database) -> bool {
        db.object_store_names().contains(&self.store_name)
    }

    async fn try_get(&self, key: &str) -> AppResult<Option<String>> {
        let db = self.database().await?;
        let mut tx = db
            .transaction(&self.store_name, TransactionMode::ReadOnly)
            .await?;
        tx.get(key).await
    }

    async fn try_keys(&self) -> AppResult<Vec<String>> {
        let db = self.database().await?;
        let mut tx = db
            .transaction(&self.store_name, TransactionMode::ReadOnly)
            .await?;
        tx.keys().await
    }

    /// Run one write in its own read-write transaction and commit it.
    async fn write(&self, op: Write<'_>) -> AppResult<()> {
        let db = self.database().await?;
        let mut tx = db
            .transaction(&self.store_name, TransactionMode::ReadWrite)
            .await?;
        match op {
            Write::Put(key, value) => tx.put(key, value).await?,
            Write::Delete(key) => tx.delete(key).await?,
            Write::Clear => tx.clear().await?,
        }
        tx.commit().await?;
        debug!(store = %self.store_name, "Committed write");
        Ok(())
    }
}

enum Write<'a> {
    Put(&'a str, &'a str),
    Delete(&'a str),
    Clear,
}

#[async_trait]
impl StorageAdapter for TransactionalStorageAdapter {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Transactional
    }

    async fn get(&self, key: &str) -> Option<String> {
        let result = self.try_get(key).await;
        recover(self.backend(), "get", Some(key), result)
    }

    async fn set(&self, key: &str, value: &str) {
        let result = self.write(Write::Put(key, value)).await;
        recover(self.backend(), "set", Some(key), result)
    }

    async fn remove(&self, key: &str) {
        let result = self.write(Write::Delete(key)).await;
        recover(self.backend(), "remove", Some(key), result)
    }

    async fn clear(&self) {
        let result = self.write(Write::Clear).await;
        recover(self.backend(), "clear", None, result)
    }

    async fn keys(&self) -> Vec<String> {
        let result = self.try_keys().await;
        recover(self.backend(), "keys", None, result)
    }
}
