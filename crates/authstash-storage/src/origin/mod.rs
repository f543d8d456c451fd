//! Origin-scoped key-value stores.

pub mod file;
pub mod memory;

pub use file::FileOriginStore;
pub use memory::MemoryOriginStore;

use authstash_core::error::AppError;
use authstash_core::result::AppResult;

/// Bytes an item occupies against a quota (UTF-16 code units, as browsers count).
pub(crate) fn item_size(key: &str, value: &str) -> u64 {
    (key.encode_utf16().count() + value.encode_utf16().count()) as u64 * 2
}

/// Fail with `QuotaExceeded` when `used` exceeds `quota`.
pub(crate) fn check_quota(used: u64, quota: Option<u64>) -> AppResult<()> {
    match quota {
        Some(limit) if used > limit => Err(AppError::quota_exceeded(format!(
            "Origin store quota of {limit} bytes exceeded ({used} bytes requested)"
        ))),
        _ => Ok(()),
    }
}
