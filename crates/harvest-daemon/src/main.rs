//! Channel harvest daemon entry point
//!
//! Run with:
//! ```bash
//! cargo run -p harvest-daemon -- run
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

mod app;
mod cli;
mod commands;

use clap::Parser;
use harvest_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(e) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {e}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(harvest_common::AppError::from(e).exit_code());
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_settings(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let command = cli.command.unwrap_or(Command::Run);
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        command = command.name(),
        channels = config.poller.channel_names.len(),
        "Configuration loaded"
    );

    if let Err(e) = commands::execute(command, config).await {
        error!(error = %e, code = e.error_code(), "Command failed");
        std::process::exit(e.exit_code());
    }
}
