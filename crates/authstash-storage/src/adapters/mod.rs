//! The uniform [`StorageAdapter`] contract over each backend.
//!
//! [`StorageAdapter`]: authstash_core::traits::StorageAdapter

pub mod cookie;
pub mod origin;
pub mod transactional;

pub use cookie::CookieStorageAdapter;
pub use origin::OriginStorageAdapter;
pub use transactional::TransactionalStorageAdapter;

use tracing::warn;

use authstash_core::result::AppResult;
use authstash_core::traits::StorageBackend;

/// Degrade a failed backend operation to its benign default.
pub(crate) fn recover<T: Default>(
    backend: StorageBackend,
    operation: &'static str,
    key: Option<&str>,
    result: AppResult<T>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(
                backend = %backend,
                operation,
                key = key.unwrap_or_default(),
                kind = %e.kind,
                error = %e,
                "Storage operation failed, degrading"
            );
            T::default()
        }
    }
}
