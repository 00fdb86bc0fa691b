//! Health handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use spendcast_core::TextAnalysisProvider;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Host of the configured AI backend
    pub ai_backend: Option<String>,
    pub ai_model: Option<String>,
}

/// GET / - Banner when no static frontend is served
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "API running" }))
}

/// GET /api/health - Liveness and AI backend configuration
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai = state.assembler.ai();
    Json(HealthResponse {
        status: "ok",
        ai_backend: ai.map(|c| c.host().to_string()),
        ai_model: ai.map(|c| c.model().to_string()),
    })
}
