//! Spendcast CLI - Expense analyzer with next-month forecast
//!
//! Usage:
//!   spendcast analyze --file CSV    Analyze expenses and forecast next month
//!   spendcast serve --port 8000     Start web server
//!   spendcast config                Show effective configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            sector,
            region,
            json,
            no_ai,
            model,
        } => {
            let ai = if no_ai {
                None
            } else {
                commands::ai_client(model.as_deref())
            };
            commands::cmd_analyze(config_path, &file, sector, region, json, ai).await
        }
        Commands::Serve {
            port,
            host,
            static_dir,
            model,
        } => {
            let ai = commands::ai_client(model.as_deref());
            commands::cmd_serve(config_path, &host, port, static_dir.as_deref(), ai).await
        }
        Commands::Config => commands::cmd_config(config_path),
    }
}
