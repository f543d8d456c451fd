//! # authstash-core
//!
//! Core crate for AuthStash. Contains the backend traits (storage adapter,
//! cookie jar, origin store, transactional database, clock), configuration
//! schemas, session events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AuthStash crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
