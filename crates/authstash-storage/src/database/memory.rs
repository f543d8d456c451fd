//! In-process transactional database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};

use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::{Database, DatabaseFactory, Schema, Transaction, TransactionMode};

use super::{WriteBuffer, WriteOp, apply_ops};

/// Committed state of one database.
#[derive(Debug, Default)]
struct DatabaseState {
    version: Mutex<u32>,
    stores: DashMap<String, BTreeMap<String, String>>,
}

/// Factory for in-process databases, keyed by name.
///
/// Databases outlive the handles opened on them, so reopening a name sees
/// the data committed through earlier handles.
#[derive(Debug, Clone)]
pub struct MemoryDatabaseFactory {
    databases: Arc<DashMap<String, Arc<DatabaseState>>>,
    available: Arc<AtomicBool>,
    opens: Arc<AtomicUsize>,
}

impl MemoryDatabaseFactory {
    /// Create a factory with no databases.
    pub fn new() -> Self {
        Self {
            databases: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(true)),
            opens: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate the database engine being blocked. Opens fail while unavailable.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of successful opens performed by this factory.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDatabaseFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseFactory for MemoryDatabaseFactory {
    async fn version(&self, name: &str) -> AppResult<u32> {
        let Some(state) = self.databases.get(name).map(|entry| entry.value().clone()) else {
            return Ok(0);
        };
        let version = state
            .version
            .lock()
            .map_err(|_| AppError::internal("Database version lock poisoned"))?;
        Ok(*version)
    }

    async fn open(&self, name: &str, schema: &Schema) -> AppResult<Arc<dyn Database>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("Database engine is unavailable"));
        }

        let state = self
            .databases
            .entry(name.to_string())
            .or_default()
            .value()
            .clone();

        {
            let mut version = state
                .version
                .lock()
                .map_err(|_| AppError::internal("Database version lock poisoned"))?;

            if schema.version < *version {
                return Err(AppError::transaction(format!(
                    "Requested version {} of '{name}' is lower than existing version {}",
                    schema.version, *version
                )));
            }

            if schema.version > *version {
                info!(database = name, from = *version, to = schema.version, "Upgrading database schema");
                for store in &schema.stores {
                    state.stores.entry(store.clone()).or_default();
                }
                *version = schema.version;
            }
        }

        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryDatabase {
            name: name.to_string(),
            version: schema.version,
            state,
        }))
    }

    async fn delete_database(&self, name: &str) -> AppResult<()> {
        self.databases.remove(name);
        debug!(database = name, "Deleted database");
        Ok(())
    }
}

/// Handle to an in-process database.
#[derive(Debug)]
pub struct MemoryDatabase {
    name: String,
    version: u32,
    state: Arc<DatabaseState>,
}

#[async_trait]
impl Database for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn object_store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.stores.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    async fn transaction(
        &self,
        store: &str,
        mode: TransactionMode,
    ) -> AppResult<Box<dyn Transaction>> {
        if !self.state.stores.contains_key(store) {
            return Err(AppError::not_found(format!(
                "Object store '{store}' does not exist in '{}'",
                self.name
            )));
        }
        Ok(Box::new(MemoryTransaction {
            state: self.state.clone(),
            store: store.to_string(),
            buffer: WriteBuffer::new(mode),
        }))
    }
}

/// Transaction over one in-process object store.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<DatabaseState>,
    store: String,
    buffer: WriteBuffer,
}

impl MemoryTransaction {
    fn committed<T>(&self, read: impl FnOnce(&BTreeMap<String, String>) -> T) -> AppResult<T> {
        self.state
            .stores
            .get(&self.store)
            .map(|entry| read(entry.value()))
            .ok_or_else(|| AppError::transaction(format!("Object store '{}' was deleted", self.store)))
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn mode(&self) -> TransactionMode {
        self.buffer.mode()
    }

    async fn get(&mut self, key: &str) -> AppResult<Option<String>> {
        self.buffer.ensure_active()?;
        if let Some(buffered) = self.buffer.lookup(key) {
            return Ok(buffered);
        }
        self.committed(|map| map.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.buffer
            .record(WriteOp::Put(key.to_string(), value.to_string()))
    }

    async fn delete(&mut self, key: &str) -> AppResult<()> {
        self.buffer.record(WriteOp::Delete(key.to_string()))
    }

    async fn clear(&mut self) -> AppResult<()> {
        self.buffer.record(WriteOp::Clear)
    }

    async fn keys(&mut self) -> AppResult<Vec<String>> {
        self.buffer.ensure_active()?;
        let committed = self.committed(|map| map.keys().cloned().collect::<Vec<_>>())?;
        Ok(self.buffer.overlay_keys(committed))
    }

    async fn commit(&mut self) -> AppResult<()> {
        let ops = self.buffer.finish()?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut entry = self.state.stores.get_mut(&self.store).ok_or_else(|| {
            AppError::transaction(format!("Object store '{}' was deleted", self.store))
        })?;
        apply_ops(&ops, entry.value_mut());
        Ok(())
    }
}
