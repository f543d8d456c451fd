//! Convenience result type alias for AuthStash.

use crate::error::AppError;

/// A specialized `Result` type for AuthStash operations.
pub type AppResult<T> = Result<T, AppError>;
