//! Key-value storage CLI commands.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use authstash_core::config::AppConfig;
use authstash_core::error::AppError;
use authstash_core::traits::{Clock, StorageAdapter, SystemClock};
use authstash_storage::{StorageManager, StorageProvider, spawn_sweeper};

use crate::output::{self, OutputFormat};

/// Arguments for storage commands
#[derive(Debug, Args)]
pub struct StorageArgs {
    /// Storage subcommand
    #[command(subcommand)]
    pub command: StorageCommand,
}

/// Storage subcommands
#[derive(Debug, Subcommand)]
pub enum StorageCommand {
    /// Read a value
    Get {
        /// Key within the configured prefix
        key: String,
    },
    /// Write a value (parsed as JSON, otherwise stored as a string)
    Set {
        /// Key within the configured prefix
        key: String,
        /// Value to store
        value: String,
        /// Lifetime in milliseconds, overriding the configured default
        #[arg(long)]
        ttl_ms: Option<u64>,
    },
    /// Remove a value
    Remove {
        /// Key within the configured prefix
        key: String,
    },
    /// List keys
    Keys {
        /// List every key the backend holds, not only this prefix
        #[arg(long)]
        all: bool,
    },
    /// Remove keys
    Clear {
        /// Remove every key the backend holds, not only this prefix
        #[arg(long)]
        all: bool,
    },
    /// Remove expired and unreadable entries
    Purge,
    /// Purge periodically until interrupted
    Sweep {
        /// Seconds between passes (default: storage.sweep_interval_seconds or 60)
        #[arg(long)]
        interval: Option<u64>,
    },
}

/// Key display row
#[derive(Debug, Serialize, Tabled)]
struct KeyRow {
    /// Key
    key: String,
}

/// Execute storage commands
pub async fn execute(
    args: &StorageArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let provider = StorageProvider::from_config(&config.storage, &config.cookie, clock.clone())?;
    let backend = provider.backend();
    let manager = StorageManager::from_config(Arc::new(provider), clock, &config.storage);

    match &args.command {
        StorageCommand::Get { key } => {
            let value = manager
                .get::<Value>(key)
                .await
                .ok_or_else(|| AppError::not_found(format!("Key '{key}' not found")))?;
            match (format, &value) {
                (OutputFormat::Table, Value::String(s)) => println!("{s}"),
                _ => output::print_json(&value),
            }
        }
        StorageCommand::Set { key, value, ttl_ms } => {
            let parsed =
                serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.clone()));
            match ttl_ms {
                Some(ttl) => manager.set_with_ttl(key, &parsed, Some(*ttl)).await,
                None => manager.set(key, &parsed).await,
            }
            output::print_success(&format!("Stored '{key}' in {backend} storage"));
        }
        StorageCommand::Remove { key } => {
            manager.remove(key).await;
            output::print_success(&format!("Removed '{key}'"));
        }
        StorageCommand::Keys { all } => {
            let keys = if *all {
                manager.keys().await
            } else {
                manager.namespaced_keys().await
            };
            let rows: Vec<KeyRow> = keys.into_iter().map(|key| KeyRow { key }).collect();
            output::print_list(&rows, format);
        }
        StorageCommand::Clear { all } => {
            if *all {
                manager.clear().await;
                output::print_success(&format!("Cleared all {backend} storage"));
            } else {
                manager.clear_namespace().await;
                output::print_success(&format!("Cleared prefix '{}'", manager.prefix()));
            }
        }
        StorageCommand::Purge => {
            let removed = manager.purge_expired().await;
            output::print_success(&format!("Purged {removed} entries"));
        }
        StorageCommand::Sweep { interval } => {
            let seconds = interval
                .or(config.storage.sweep_interval_seconds)
                .unwrap_or(60)
                .max(1);
            let handle = spawn_sweeper(manager, Duration::from_secs(seconds));
            output::print_success(&format!("Sweeping every {seconds}s, press Ctrl-C to stop"));
            tokio::signal::ctrl_c()
                .await
                .map_err(|e| AppError::internal(format!("Failed to listen for Ctrl-C: {e}")))?;
            handle.abort();
        }
    }

    Ok(())
}
