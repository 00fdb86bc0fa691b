//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. The narrative prompt comes from
//! the prompt file, which can be overridden in the data dir.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::SpendingSummary;
use crate::prompts::Prompt;

use super::parsing::parse_narrative;
use super::types::{AnalysisContext, Narrative};
use super::TextAnalysisProvider;

/// Ollama backend
///
/// Sends the rendered narrative prompt to `/api/generate` with streaming
/// disabled. The system section of the prompt is passed as `system`.
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    default_model: String,
    prompt: Arc<Prompt>,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, default_model: &str) -> Self {
        Self::with_prompt(base_url, default_model, Prompt::load_default())
    }

    pub fn with_prompt(base_url: &str, default_model: &str, prompt: Prompt) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model: default_model.to_string(),
            prompt: Arc::new(prompt),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            default_model: model.to_string(),
            prompt: self.prompt.clone(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl TextAnalysisProvider for OllamaBackend {
    async fn analyze_spending(
        &self,
        summary: &SpendingSummary,
        context: &AnalysisContext,
    ) -> Result<Narrative> {
        let request = OllamaRequest {
            model: &self.default_model,
            prompt: self.prompt.render_narrative(summary, context),
            system: self.prompt.system_section(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!("Ollama narrative response: {}", ollama_response.response);

        parse_narrative(&ollama_response.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.default_model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
