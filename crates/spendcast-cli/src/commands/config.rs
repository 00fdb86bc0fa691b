//! Config command implementation

use std::path::Path;

use anyhow::Result;
use spendcast_core::config::default_config_path;

use super::load_config;

/// Effective configuration rendered as TOML
pub fn config_toml(config_path: Option<&Path>) -> Result<String> {
    let config = load_config(config_path)?;
    Ok(config.to_toml()?)
}

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let toml = config_toml(config_path)?;

    if let Some(path) = config_path {
        println!("# Source: {}", path.display());
    } else if let Some(path) = default_config_path().filter(|p| p.exists()) {
        println!("# Source: {}", path.display());
    } else {
        println!("# Source: built-in defaults");
    }
    println!("{}", toml);
    Ok(())
}
