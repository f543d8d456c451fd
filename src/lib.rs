//! # authstash
//!
//! Session token lifecycle and pluggable key-value storage.
//!
//! ## Crates
//!
//! - `authstash_core`: errors, configuration, events and backend traits
//! - `authstash_storage`: cookie, origin and transactional backends, the
//!   uniform storage adapters and the namespaced [`StorageManager`]
//! - `authstash_session`: the [`TokenService`] credential lifecycle

pub use authstash_core::{config, error, events, result, traits};
pub use authstash_session as session;
pub use authstash_storage as storage;

pub use authstash_core::config::AppConfig;
pub use authstash_core::error::{AppError, ErrorKind};
pub use authstash_core::result::AppResult;
pub use authstash_core::traits::{Clock, ManualClock, StorageAdapter, StorageBackend, SystemClock};
pub use authstash_session::{
    IssuanceResponse, PersistOutcome, SessionEvents, SessionState, TokenService, UserInfo,
};
pub use authstash_storage::{StorageManager, StorageManagerConfig, StorageProvider};
