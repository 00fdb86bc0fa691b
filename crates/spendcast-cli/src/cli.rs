//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendcast - Forecast next month's spending from an expense CSV
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "Expense analyzer with next-month forecast", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analysis config file (TOML)
    ///
    /// Falls back to SPENDCAST_CONFIG, then ~/.local/share/spendcast/config.toml,
    /// then built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an expense CSV and forecast next month
    Analyze {
        /// CSV file with date, category, concept, amount, expense_type columns
        #[arg(short, long)]
        file: PathBuf,

        /// Business sector to give the AI narrative context
        #[arg(long)]
        sector: Option<String>,

        /// Region or market to give the AI narrative context
        #[arg(long)]
        region: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Skip the AI backend and use the fallback narrative
        #[arg(long)]
        no_ai: bool,

        /// Override the AI model (default: OLLAMA_MODEL / OPENAI_COMPATIBLE_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (default: $PORT or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., frontend/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Override the AI model (default: OLLAMA_MODEL / OPENAI_COMPATIBLE_MODEL)
        #[arg(long)]
        model: Option<String>,
    },

    /// Print the effective analysis configuration
    Config,
}
