//! Storage manager scenarios over every configured backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use authstash::config::{CodecKind, CookieConfig, OriginStoreKind, StorageConfig};
use authstash::{ManualClock, StorageAdapter, StorageBackend, StorageManager, StorageProvider};

use super::helpers::T0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Preferences {
    theme: String,
    font_size: u8,
    pinned: Vec<String>,
    beta: Option<bool>,
}

fn preferences() -> Preferences {
    Preferences {
        theme: "dark".to_string(),
        font_size: 14,
        pinned: vec!["inbox".to_string(), "drafts".to_string()],
        beta: None,
    }
}

/// One storage config per backend; the origin backend writes into `dir`.
fn configs(dir: &std::path::Path) -> Vec<StorageConfig> {
    let mut origin = StorageConfig::default();
    origin.origin.kind = OriginStoreKind::File;
    origin.origin.path = dir.join("origin.json").display().to_string();

    vec![
        StorageConfig {
            backend: StorageBackend::Cookie,
            ..StorageConfig::default()
        },
        origin,
        StorageConfig {
            backend: StorageBackend::Transactional,
            ..StorageConfig::default()
        },
    ]
}

fn build_manager(
    config: &StorageConfig,
    clock: Arc<ManualClock>,
) -> (StorageManager, Arc<StorageProvider>) {
    let provider = Arc::new(
        StorageProvider::from_config(config, &CookieConfig::default(), clock.clone()).unwrap(),
    );
    let manager = StorageManager::from_config(provider.clone(), clock, config);
    (manager, provider)
}

#[tokio::test]
async fn test_round_trip_on_every_backend() {
    let dir = tempfile::tempdir().unwrap();
    for config in configs(dir.path()) {
        let clock = Arc::new(ManualClock::new(T0));
        let (manager, provider) = build_manager(&config, clock);

        manager.set("prefs", &preferences()).await;
        assert_eq!(
            manager.get::<Preferences>("prefs").await,
            Some(preferences()),
            "{}",
            provider.backend()
        );
        assert_eq!(manager.namespaced_keys().await, vec!["prefs"]);
    }
}

#[tokio::test]
async fn test_ttl_expiry_deletes_at_adapter_level() {
    let dir = tempfile::tempdir().unwrap();
    for mut config in configs(dir.path()) {
        config.ttl_ms = Some(1000);
        let clock = Arc::new(ManualClock::new(T0));
        let (manager, provider) = build_manager(&config, clock.clone());

        manager.set("k", "v").await;
        clock.set(T0 + 1000);
        assert_eq!(manager.get::<String>("k").await.as_deref(), Some("v"));

        clock.set(T0 + 1001);
        assert_eq!(manager.get::<String>("k").await, None);
        assert_eq!(provider.get("app:k").await, None, "{}", provider.backend());
    }
}

#[tokio::test]
async fn test_base64_codec_from_config() {
    let config = StorageConfig {
        backend: StorageBackend::Transactional,
        codec: CodecKind::Base64,
        ..StorageConfig::default()
    };
    let (manager, provider) = build_manager(&config, Arc::new(ManualClock::new(T0)));

    manager.set("prefs", &preferences()).await;
    let raw = provider.get("app:prefs").await.unwrap();
    assert!(!raw.contains("dark"));
    assert_eq!(manager.get::<Preferences>("prefs").await, Some(preferences()));
}

#[tokio::test]
async fn test_namespaces_share_one_backend() {
    let config = StorageConfig {
        backend: StorageBackend::Transactional,
        ..StorageConfig::default()
    };
    let clock = Arc::new(ManualClock::new(T0));
    let (app, provider) = build_manager(&config, clock.clone());
    let ui = StorageManager::from_config(
        provider.clone(),
        clock,
        &StorageConfig {
            prefix: "ui".to_string(),
            ..config.clone()
        },
    );

    app.set("a", &1).await;
    ui.set("a", &2).await;
    assert_eq!(app.get::<i32>("a").await, Some(1));
    assert_eq!(ui.get::<i32>("a").await, Some(2));

    ui.clear_namespace().await;
    assert_eq!(provider.keys().await, vec!["app:a"]);
}

#[tokio::test]
async fn test_purge_on_file_backend_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = configs(dir.path()).remove(1);
    let clock = Arc::new(ManualClock::new(T0));
    let (manager, _) = build_manager(&config, clock.clone());

    manager.set_with_ttl("short", "v", Some(10)).await;
    manager.set("long", "v").await;
    clock.set(T0 + 100);
    assert_eq!(manager.purge_expired().await, 1);

    let (reopened, _) = build_manager(&config, clock);
    assert_eq!(reopened.namespaced_keys().await, vec!["long"]);
}
