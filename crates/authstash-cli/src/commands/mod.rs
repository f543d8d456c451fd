//! CLI command definitions and dispatch.

pub mod config;
pub mod session;
pub mod storage;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use authstash_core::config::AppConfig;
use authstash_core::error::AppError;
use authstash_core::result::AppResult;

use crate::output::OutputFormat;

/// AuthStash: session token lifecycle and key-value storage
#[derive(Debug, Parser)]
#[command(name = "authstash", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (default: config/default.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment overlay loaded from config/{env}.toml
    #[arg(short, long, global = true, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Session token management
    Session(session::SessionArgs),
    /// Namespaced key-value storage
    Storage(storage::StorageArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load configuration from the selected file, overlay and environment.
    pub fn load_config(&self) -> AppResult<AppConfig> {
        let path = self.config.as_ref().map(|p| p.to_string_lossy().into_owned());
        AppConfig::load_from(path.as_deref(), &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, loaded: AppResult<AppConfig>) -> Result<(), AppError> {
        match &self.command {
            Commands::Config(args) => config::execute(args, self.config_label(), loaded, self.format),
            Commands::Session(args) => session::execute(args, &loaded?, self.format),
            Commands::Storage(args) => storage::execute(args, &loaded?, self.format).await,
        }
    }

    fn config_label(&self) -> String {
        self.config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "config/default.toml".to_string())
    }
}
