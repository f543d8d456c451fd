//! Shared test helpers for integration tests.

use std::sync::Arc;

use authstash::traits::{CookieJar, OriginStore};
use authstash::storage::cookie::{CookieManager, MemoryCookieJar};
use authstash::storage::origin::{FileOriginStore, MemoryOriginStore};
use authstash::{AppConfig, IssuanceResponse, ManualClock, TokenService};

/// Epoch-ms start time for simulated clocks.
pub const T0: i64 = 1_700_000_000_000;

/// One browser profile: shared origin store, one tab's cookie jar.
pub struct TestProfile {
    pub clock: Arc<ManualClock>,
    pub jar: Arc<MemoryCookieJar>,
    pub origin: Arc<dyn OriginStore>,
    pub config: AppConfig,
}

impl TestProfile {
    /// A profile with an in-memory origin store.
    pub fn in_memory() -> Self {
        Self::with_origin(Arc::new(MemoryOriginStore::new()))
    }

    /// A profile whose origin store lives in `path`.
    pub fn on_disk(path: &std::path::Path) -> Self {
        let store = FileOriginStore::open(path, None).expect("Failed to open origin file");
        Self::with_origin(Arc::new(store))
    }

    fn with_origin(origin: Arc<dyn OriginStore>) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let jar = Arc::new(MemoryCookieJar::new(clock.clone()));
        Self {
            clock,
            jar,
            origin,
            config: AppConfig::default(),
        }
    }

    /// A token service over this profile's channels.
    pub fn service(&self) -> TokenService {
        TokenService::from_config(
            &self.config,
            self.jar.clone() as Arc<dyn CookieJar>,
            self.origin.clone(),
            self.clock.clone(),
        )
    }

    /// A cookie manager over this profile's jar.
    pub fn cookies(&self) -> CookieManager {
        CookieManager::new(self.jar.clone(), self.config.cookie.clone())
    }
}

/// A typical login response.
pub fn issuance() -> IssuanceResponse {
    serde_json::from_value(serde_json::json!({
        "access_token": "A",
        "refresh_token": "R",
        "expires_in": 3600,
        "refresh_expires_in": 604800,
        "user_id": "u1",
        "email": "a@x",
        "roles": ["admin", "editor"],
        "issued_at": "2024-01-01T00:00:00Z"
    }))
    .expect("Invalid issuance fixture")
}
