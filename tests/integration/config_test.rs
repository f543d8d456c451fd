//! Configuration loading from files.

use authstash::config::{CodecKind, DatabaseKind, SameSite};
use authstash::{AppConfig, ErrorKind, StorageBackend};

#[test]
fn test_load_from_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("authstash.toml");
    std::fs::write(
        &path,
        r#"
            [storage]
            backend = "transactional"
            prefix = "prefs"
            ttl_ms = 60000
            codec = "base64"
            sweep_interval_seconds = 30

            [storage.database]
            kind = "redis"
            redis_url = "redis://cache:6379"

            [cookie]
            same_site = "lax"

            [token]
            refresh_window_seconds = 120

            [logging]
            level = "debug"
            format = "json"
        "#,
    )
    .unwrap();

    let config = AppConfig::load_from(path.to_str(), "integration-test").unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Transactional);
    assert_eq!(config.storage.prefix, "prefs");
    assert_eq!(config.storage.ttl_ms, Some(60_000));
    assert_eq!(config.storage.codec, CodecKind::Base64);
    assert_eq!(config.storage.sweep_interval_seconds, Some(30));
    assert_eq!(config.storage.database.kind, DatabaseKind::Redis);
    assert_eq!(config.storage.database.store, "keyval");
    assert_eq!(config.cookie.same_site, SameSite::Lax);
    assert_eq!(config.token.refresh_window_ms(), 120_000);
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_missing_explicit_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = AppConfig::load_from(path.to_str(), "integration-test").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}

#[test]
fn test_invalid_value_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[storage]\nbackend = \"floppy\"\n").unwrap();
    let err = AppConfig::load_from(path.to_str(), "integration-test").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Configuration);
}
