//! Core traits defined in `authstash-core` and implemented by other crates.

pub mod adapter;
pub mod clock;
pub mod cookie_jar;
pub mod database;
pub mod origin;

pub use adapter::{StorageAdapter, StorageBackend};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cookie_jar::CookieJar;
pub use database::{Database, DatabaseFactory, Schema, Transaction, TransactionMode};
pub use origin::OriginStore;
