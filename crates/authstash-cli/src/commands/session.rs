//! Session management CLI commands.
//!
//! Every invocation uses a fresh, process-local cookie jar, so reads go
//! through the file-backed origin store.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use authstash_core::config::AppConfig;
use authstash_core::error::AppError;
use authstash_core::traits::{Clock, SystemClock};
use authstash_session::{IssuanceResponse, SessionState, TokenService};
use authstash_storage::cookie::MemoryCookieJar;
use authstash_storage::origin::FileOriginStore;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Persist an issuance response read from a JSON file
    Store {
        /// Path to the issuance JSON
        file: PathBuf,
    },
    /// Show the derived session state
    Status,
    /// Remove the stored session (logout)
    Clear,
    /// Show the signed-in user
    Whoami,
}

/// Session status report
#[derive(Debug, Serialize)]
struct SessionStatus {
    state: SessionState,
    authenticated: bool,
    access_token_expired: bool,
    refresh_token_expired: bool,
    expires_in_seconds: Option<u64>,
}

/// Execute session commands
pub fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let service = build_service(config)?;

    match &args.command {
        SessionCommand::Store { file } => {
            let raw = std::fs::read_to_string(file).map_err(|e| {
                AppError::validation(format!("Failed to read '{}': {e}", file.display()))
            })?;
            let issuance: IssuanceResponse = serde_json::from_str(&raw)?;
            let outcome = service.store_tokens(&issuance)?;

            match format {
                OutputFormat::Json => output::print_json(&outcome),
                OutputFormat::Table => {
                    output::print_success(&format!("Session stored for '{}'", issuance.user_id));
                    output::print_kv("Cookie channel", &outcome.cookie.to_string());
                    output::print_kv("Origin channel", &outcome.origin.to_string());
                }
            }
        }
        SessionCommand::Status => {
            // Derive the state first: an expired refresh token clears the session.
            let state = service.session_state();
            let status = SessionStatus {
                state,
                authenticated: state.is_authenticated(),
                access_token_expired: service.is_access_token_expired(),
                refresh_token_expired: service.is_refresh_token_expired(),
                expires_in_seconds: service.time_until_expiry(),
            };

            match format {
                OutputFormat::Json => output::print_json(&status),
                OutputFormat::Table => {
                    output::print_kv("State", &status.state.to_string());
                    output::print_kv("Authenticated", &status.authenticated.to_string());
                    output::print_kv(
                        "Access token expired",
                        &status.access_token_expired.to_string(),
                    );
                    output::print_kv(
                        "Refresh token expired",
                        &status.refresh_token_expired.to_string(),
                    );
                    if let Some(secs) = status.expires_in_seconds {
                        let at = Utc::now() + Duration::seconds(secs as i64);
                        output::print_kv(
                            "Access expires",
                            &format!("in {secs}s ({})", at.format("%Y-%m-%d %H:%M:%S UTC")),
                        );
                    }
                }
            }
        }
        SessionCommand::Clear => {
            service.clear_tokens();
            output::print_success("Session cleared");
        }
        SessionCommand::Whoami => match service.user_info() {
            Some(info) => match format {
                OutputFormat::Json => output::print_json(&info),
                OutputFormat::Table => {
                    output::print_kv("User ID", &info.user_id);
                    output::print_kv("Email", &info.email);
                    output::print_kv("Roles", &info.roles.join(", "));
                }
            },
            None => output::print_warning("Not signed in"),
        },
    }

    Ok(())
}

fn build_service(config: &AppConfig) -> Result<TokenService, AppError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let origin = &config.storage.origin;
    let store = FileOriginStore::open(&origin.path, origin.quota_bytes)?;
    let jar = MemoryCookieJar::new(clock.clone());
    Ok(TokenService::from_config(
        config,
        Arc::new(jar),
        Arc::new(store),
        clock,
    ))
}
