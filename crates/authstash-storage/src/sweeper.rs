//! Periodic removal of expired entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use crate::manager::StorageManager;

/// Shortest accepted sweep period.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Spawn a task that runs [`StorageManager::purge_expired`] every `period`.
///
/// The first pass runs immediately. Periods below [`MIN_SWEEP_PERIOD`],
/// zero included, are raised to it. Abort the returned handle to stop it.
pub fn spawn_sweeper(manager: StorageManager, period: Duration) -> JoinHandle<()> {
    let period = period.max(MIN_SWEEP_PERIOD);
    info!(
        prefix = manager.prefix(),
        period_secs = period.as_secs(),
        "Starting expired-entry sweeper"
    );
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        loop {
            interval.tick().await;
            let removed = manager.purge_expired().await;
            debug!(prefix = manager.prefix(), removed, "Sweep finished");
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::OriginStorageAdapter;
    use crate::manager::StorageManagerConfig;
    use crate::origin::MemoryOriginStore;
    use authstash_core::traits::ManualClock;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_periodically() {
        let clock = Arc::new(ManualClock::new(0));
        let adapter = Arc::new(OriginStorageAdapter::new(Arc::new(MemoryOriginStore::new())));
        let manager = StorageManager::new(adapter, clock.clone(), StorageManagerConfig::default());

        manager.set_with_ttl("a", "v", Some(10)).await;
        manager.set_with_ttl("b", "v", Some(1_000)).await;
        clock.set(100);

        let handle = spawn_sweeper(manager.clone(), Duration::from_secs(60));
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(manager.namespaced_keys().await, vec!["b"]);

        clock.set(5_000);
        time::sleep(Duration::from_secs(60)).await;
        assert!(manager.namespaced_keys().await.is_empty());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_is_clamped() {
        let clock = Arc::new(ManualClock::new(0));
        let adapter = Arc::new(OriginStorageAdapter::new(Arc::new(MemoryOriginStore::new())));
        let manager = StorageManager::new(adapter, clock.clone(), StorageManagerConfig::default());

        manager.set_with_ttl("a", "v", Some(10)).await;
        clock.set(100);

        let handle = spawn_sweeper(manager.clone(), Duration::ZERO);
        time::sleep(Duration::from_millis(1)).await;
        assert!(manager.namespaced_keys().await.is_empty());

        manager.set_with_ttl("b", "v", Some(10)).await;
        clock.set(200);
        time::sleep(MIN_SWEEP_PERIOD).await;
        assert!(manager.namespaced_keys().await.is_empty());
        assert!(!handle.is_finished());

        handle.abort();
    }
}
