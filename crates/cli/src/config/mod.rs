//! CLI configuration

use std::path::PathBuf;

use clap::Parser;

use crate::{
    commands::Command,
    config::{logging::LoggingConfig, store::StoreConfig},
};

pub(crate) mod logging;
pub(crate) mod store;

/// Satchel storefront CLI
#[derive(Debug, Parser)]
#[command(name = "satchel-cli", about = "Satchel storefront CLI", long_about = None)]
pub struct CliConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Store display settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// YAML seed for the in-memory store; the bundled storefront when omitted
    #[arg(long, global = true, env = "SATCHEL_FIXTURE")]
    pub fixture: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
