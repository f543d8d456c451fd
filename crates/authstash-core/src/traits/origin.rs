//! `localStorage`-style origin store interface.

use crate::result::AppResult;

/// A synchronous, origin-scoped string key-value store.
///
/// Every operation may fail (store disabled, quota exceeded, backing file
/// unwritable); callers decide whether to degrade or surface the error.
pub trait OriginStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read an item.
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    /// Write an item.
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    /// Delete an item. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> AppResult<()>;

    /// Delete every item.
    fn clear(&self) -> AppResult<()>;

    /// List every key.
    fn keys(&self) -> AppResult<Vec<String>>;
}
