//! Server command implementation

use std::path::Path;

use anyhow::Result;
use spendcast_core::AIClient;
use spendcast_server::ServerConfig;

use super::load_config;

const DEFAULT_PORT: u16 = 8000;

/// Explicit --port, then $PORT, then the default
pub fn resolve_port(port: Option<u16>) -> Result<u16> {
    if let Some(port) = port {
        return Ok(port);
    }
    match std::env::var("PORT") {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value: {}", value)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

pub async fn cmd_serve(
    config_path: Option<&Path>,
    host: &str,
    port: Option<u16>,
    static_dir: Option<&Path>,
    ai: Option<AIClient>,
) -> Result<()> {
    let analysis = load_config(config_path)?;
    let port = resolve_port(port)?;
    let server_config = ServerConfig::from_env();

    println!("🚀 Starting Spendcast web server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    if server_config.allowed_origins.is_empty() {
        println!("   🔒 CORS: same-origin only");
    } else {
        println!(
            "   🌐 CORS origins: {} (SPENDCAST_ALLOWED_ORIGINS)",
            server_config.allowed_origins.join(", ")
        );
    }
    println!();

    let static_dir_str = static_dir.and_then(|p| p.to_str());
    spendcast_server::serve(analysis, ai, host, port, static_dir_str, server_config).await
}
