//! Satchel storefront CLI
//!
//! Runs storefront sessions against an in-memory store seeded from YAML.

use std::{io, process};

use tracing::{error, info};

use satchel_app::context::AppContext;

use crate::{commands::CommandError, config::CliConfig};

mod commands;
mod config;
mod fixtures;
mod observability;
mod render;

#[tokio::main]
pub async fn main() {
    let config = CliConfig::load().unwrap_or_else(|e| e.exit());

    if let Err(e) = observability::init_subscriber(&config.logging) {
        fail(&format!("Logging error: {e}"));
    }

    let settings = match config.store.settings() {
        Ok(settings) => settings,
        Err(e) => fail(&format!("Configuration error: {e}")),
    };

    let backend = match fixtures::load_backend(config.fixture.as_deref()) {
        Ok(backend) => backend,
        Err(e) => {
            error!("failed to load fixture: {e}");

            fail(&format!("Fixture error: {e}"))
        }
    };

    info!(
        currency = settings.currency_code(),
        fixture = ?config.fixture,
        "store ready"
    );

    let app = AppContext::in_memory(&backend, settings);

    if let Err(e) = config.command.run(&app, &backend, io::stdout().lock()).await {
        report(&e);
    }
}

fn report(e: &CommandError) -> ! {
    error!("command failed: {e}");

    fail(&e.user_message())
}

#[expect(
    clippy::print_stderr,
    reason = "failures are reported on stderr after logging"
)]
#[expect(clippy::exit, reason = "the binary's only exit point")]
fn fail(message: &str) -> ! {
    eprintln!("{message}");

    process::exit(1);
}
