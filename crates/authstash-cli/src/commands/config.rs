//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use authstash_core::config::{AppConfig, DatabaseKind, OriginStoreKind};
use authstash_core::error::AppError;
use authstash_core::result::AppResult;
use authstash_core::traits::StorageBackend;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    label: String,
    config: AppResult<AppConfig>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = config?;
            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => println!("{config:#?}"),
            }
        }
        ConfigCommand::Validate => match config {
            Ok(config) => {
                output::print_success(&format!("Configuration '{label}' is valid"));
                output::print_kv("Storage backend", &config.storage.backend.to_string());
                output::print_kv("Storage prefix", &config.storage.prefix);
                output::print_kv("Storage detail", &backend_detail(&config));
                output::print_kv("Cookie same-site", &config.cookie.same_site.to_string());
                output::print_kv("Cookie secure", &config.cookie.secure().to_string());
                output::print_kv(
                    "Refresh window",
                    &format!("{}s", config.token.refresh_window_seconds),
                );
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

fn backend_detail(config: &AppConfig) -> String {
    let storage = &config.storage;
    match storage.backend {
        StorageBackend::Cookie => format!("max-age {}s", storage.cookie_max_age_seconds),
        StorageBackend::Origin => match storage.origin.kind {
            OriginStoreKind::Memory => "in-memory origin store".to_string(),
            OriginStoreKind::File => format!("origin file {}", storage.origin.path),
        },
        StorageBackend::Transactional => match storage.database.kind {
            DatabaseKind::Memory => format!(
                "in-memory database {}/{}",
                storage.database.name, storage.database.store
            ),
            DatabaseKind::Redis => format!(
                "redis database {}/{} at {}",
                storage.database.name,
                storage.database.store,
                mask_password(&storage.database.redis_url)
            ),
        },
    }
}

/// Mask password in a connection URL for display
fn mask_password(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}****{}", &url[..colon_pos + 1], &url[at_pos..]);
            }
        }
    }
    url.to_string()
}
