//! Analysis handler

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use spendcast_core::{AnalysisContext, AnalysisReport};

/// POST /api/analyze - Analyze an expense CSV
///
/// Expects multipart form with:
/// - file: CSV file (required, max 10MB)
/// - sector: Business sector for the narrative (optional)
/// - region: Region or market for the narrative (optional)
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisReport>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut sector: Option<String> = None;
    let mut region: Option<String> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|_| {
                    AppError::bad_request(&format!(
                        "Failed to read file data. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    ))
                })?;

                // Check file size limit
                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "sector" => {
                sector = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::bad_request("Failed to read sector"))?,
                );
            }
            "region" => {
                region = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::bad_request("Failed to read region"))?,
                );
            }
            _ => {}
        }
    }

    // Validate required fields
    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let context = AnalysisContext::new(sector, region);

    info!(
        file = file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = file_data.len(),
        "Analyzing upload"
    );

    analyze_core(&state, &file_data, &context).await.map(Json)
}

/// Core analysis logic - separated from multipart parsing for testability
pub async fn analyze_core(
    state: &AppState,
    data: &[u8],
    context: &AnalysisContext,
) -> Result<AnalysisReport, AppError> {
    state
        .assembler
        .analyze_csv(data, context)
        .await
        .map_err(AppError::analysis)
}
