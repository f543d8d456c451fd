//! # authstash-storage
//!
//! Persistence backends and the generic storage facility for AuthStash.
//!
//! - **cookie**: cookie string building/parsing and an in-process jar
//! - **origin**: origin-scoped key-value stores (memory, JSON file)
//! - **database**: transactional databases (memory, Redis)
//! - **adapters**: the uniform get/set/remove/clear/keys contract over each
//! - **manager**: namespacing, TTL envelopes and lazy expiry
//! - **sweeper**: optional periodic purge of expired entries
//!
//! The adapter is selected at runtime from configuration via
//! [`StorageProvider`].

pub mod adapters;
pub mod codec;
pub mod cookie;
pub mod database;
pub mod manager;
pub mod origin;
pub mod provider;
pub mod sweeper;

pub use adapters::{CookieStorageAdapter, OriginStorageAdapter, TransactionalStorageAdapter};
pub use codec::{Base64Codec, IdentityCodec, ValueCodec, codec_for};
pub use cookie::{CookieManager, CookieOptions, MemoryCookieJar};
pub use manager::{Envelope, StorageManager, StorageManagerConfig};
pub use provider::StorageProvider;
pub use sweeper::spawn_sweeper;
