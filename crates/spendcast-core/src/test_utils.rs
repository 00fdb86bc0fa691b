//! Test utilities for spendcast-core
//!
//! This module provides testing infrastructure including a mock Ollama server
//! that can be used for development and integration tests.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock Ollama server for testing and development
///
/// Answers `/api/generate` with a narrative JSON that names the categories
/// found in the prompt's category table.
pub struct MockOllamaServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let categories = categories_from_prompt(&request.prompt);
    let first = categories
        .first()
        .cloned()
        .unwrap_or_else(|| "Uncategorized".to_string());

    let narrative = NarrativeResponse {
        patterns: vec![
            format!("{} is the largest spending category", first),
            format!("{} categories recorded", categories.len()),
            "Monthly totals are broadly stable".to_string(),
        ],
        anomalies: vec![
            "No unusual single transactions".to_string(),
            "No missing months".to_string(),
        ],
        recommendations: vec![
            format!("Set a monthly budget for {}", first),
            "Review recurring expenses quarterly".to_string(),
        ],
    };

    // Wrap in prose like a real model would
    let response = format!(
        "Here is the analysis:\n{}",
        serde_json::to_string(&narrative).unwrap()
    );

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

/// Category names from the rows of the "Spending by category:" table
fn categories_from_prompt(prompt: &str) -> Vec<String> {
    let Some(start) = prompt.find("Spending by category:") else {
        return Vec::new();
    };
    prompt[start..]
        .lines()
        .skip(2) // title and header row
        .take_while(|line| !line.trim().is_empty())
        .filter_map(|line| line.split("  ").next())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Serialize)]
struct NarrativeResponse {
    patterns: Vec<String>,
    anomalies: Vec<String>,
    recommendations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_from_prompt() {
        let prompt = "intro\nSpending by category:\ncategory      sum\nFood          120.00\nHousing       900.00\n\nSpending by expense type:\n";
        assert_eq!(categories_from_prompt(prompt), vec!["Food", "Housing"]);
        assert!(categories_from_prompt("nothing here").is_empty());
    }
}
