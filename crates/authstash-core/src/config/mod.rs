//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! optional TOML files and `AUTHSTASH__`-prefixed environment variables.
//! Every field has a default, so an empty source yields a usable config.

pub mod cookie;
pub mod logging;
pub mod storage;
pub mod token;

use serde::{Deserialize, Serialize};

pub use self::cookie::{CookieConfig, SameSite};
pub use self::logging::LoggingConfig;
pub use self::storage::{
    CodecKind, DatabaseConfig, DatabaseKind, OriginStoreConfig, OriginStoreKind, StorageConfig,
};
pub use self::token::TokenConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generic key-value storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Cookie attribute defaults.
    #[serde(default)]
    pub cookie: CookieConfig,
    /// Token lifecycle settings.
    #[serde(default)]
    pub token: TokenConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment.
    ///
    /// Merges `config/default.toml`, `config/{env}.toml`, and environment
    /// variables prefixed with `AUTHSTASH__` (double underscore separates
    /// nested sections, e.g. `AUTHSTASH__STORAGE__PREFIX`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(None, env)
    }

    /// Load configuration with an explicit base file in front of the
    /// environment overlay.
    pub fn load_from(path: Option<&str>, env: &str) -> Result<Self, AppError> {
        let base = path.unwrap_or("config/default");
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(path.is_some()))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AUTHSTASH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.storage.prefix, "app");
        assert_eq!(config.storage.ttl_ms, None);
        assert_eq!(config.cookie.path, "/");
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.token.refresh_window_seconds, 300);
        assert_eq!(config.storage.database.name, "authstash");
        assert_eq!(config.storage.database.store, "keyval");
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [storage]
            backend = "transactional"
            prefix = "ui"
            ttl_ms = 1000
            codec = "base64"

            [storage.database]
            kind = "memory"
            name = "prefs"

            [cookie]
            same_site = "lax"
            secure = true
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(
            config.storage.backend,
            crate::traits::StorageBackend::Transactional
        );
        assert_eq!(config.storage.prefix, "ui");
        assert_eq!(config.storage.ttl_ms, Some(1000));
        assert_eq!(config.storage.codec, CodecKind::Base64);
        assert_eq!(config.storage.database.name, "prefs");
        assert_eq!(config.storage.database.store, "keyval");
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert_eq!(config.cookie.secure, Some(true));
    }
}
