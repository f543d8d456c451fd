//! `IndexedDB`-style transactional database interface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::result::AppResult;

/// Scope of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only; writes are rejected.
    ReadOnly,
    /// Reads and writes, applied on commit.
    ReadWrite,
}

/// Requested schema for a database open.
///
/// When the stored version is lower than `version` (or the database does
/// not exist yet), the factory runs an upgrade that creates every missing
/// object store in `stores`. Opening with a version lower than the stored
/// one fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Schema version, starting at 1.
    pub version: u32,
    /// Object stores that must exist after the open.
    pub stores: Vec<String>,
}

impl Schema {
    /// A version-1 schema with a single object store.
    pub fn single_store(store: impl Into<String>) -> Self {
        Self {
            version: 1,
            stores: vec![store.into()],
        }
    }
}

/// Opens named databases.
#[async_trait]
pub trait DatabaseFactory: Send + Sync + std::fmt::Debug + 'static {
    /// Stored schema version of `name`, or 0 when it does not exist.
    async fn version(&self, name: &str) -> AppResult<u32>;

    /// Open (creating or upgrading as needed) the database `name`.
    async fn open(&self, name: &str, schema: &Schema) -> AppResult<Arc<dyn Database>>;

    /// Delete the database `name` and all its stores.
    async fn delete_database(&self, name: &str) -> AppResult<()>;
}

/// An open database handle.
#[async_trait]
pub trait Database: Send + Sync + std::fmt::Debug {
    /// Database name.
    fn name(&self) -> &str;

    /// Schema version the handle was opened at.
    fn version(&self) -> u32;

    /// Names of the object stores in this database.
    fn object_store_names(&self) -> Vec<String>;

    /// Begin a transaction over one object store.
    async fn transaction(
        &self,
        store: &str,
        mode: TransactionMode,
    ) -> AppResult<Box<dyn Transaction>>;
}

/// A transaction scoped to one object store.
///
/// Writes become visible to other transactions only after
/// [`Transaction::commit`]; dropping an uncommitted transaction aborts it.
#[async_trait]
pub trait Transaction: Send + std::fmt::Debug {
    /// Mode this transaction was opened with.
    fn mode(&self) -> TransactionMode;

    /// Read a value.
    async fn get(&mut self, key: &str) -> AppResult<Option<String>>;

    /// Insert or replace a value.
    async fn put(&mut self, key: &str, value: &str) -> AppResult<()>;

    /// Delete a value.
    async fn delete(&mut self, key: &str) -> AppResult<()>;

    /// Delete every value in the store.
    async fn clear(&mut self) -> AppResult<()>;

    /// List every key in the store.
    async fn keys(&mut self) -> AppResult<Vec<String>>;

    /// Apply buffered writes atomically.
    async fn commit(&mut self) -> AppResult<()>;
}
