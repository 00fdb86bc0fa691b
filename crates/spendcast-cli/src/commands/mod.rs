//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Run the analysis pipeline on a CSV file
//! - `config` - Show the effective configuration
//! - `serve` - Web server command

pub mod analyze;
pub mod config;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use config::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{AIClient, AnalysisConfig};

/// Load the analysis config, explicit path first
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    AnalysisConfig::load(path).context("Failed to load analysis config")
}

/// AI backend from the environment, with an optional model override
pub fn ai_client(model: Option<&str>) -> Option<AIClient> {
    with_model_override(AIClient::from_env(), model)
}

pub fn with_model_override(ai: Option<AIClient>, model: Option<&str>) -> Option<AIClient> {
    match (ai, model) {
        (Some(client), Some(model)) if !model.trim().is_empty() => {
            Some(client.with_model(model.trim()))
        }
        (ai, _) => ai,
    }
}

/// Truncate a string to `max` characters, marking the cut with "..."
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
