//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use spendcast_core::{AIClient, AnalysisContext, Narrative, TextAnalysisProvider};
use tempfile::NamedTempFile;

use crate::commands::{self, truncate};

const SAMPLE_CSV: &str = "date,category,concept,amount,expense_type
2024-01-05,Housing,Rent,800,fixed
2024-01-20,Food,Supermarket,200,variable
2024-02-05,Housing,Rent,800,fixed
2024-02-11,Food,Restaurant,N/A,variable
2024-02-18,Food,Supermarket,400,variable
2024-03-05,Housing,Rent,800,fixed
2024-03-22,Food,Supermarket,300,variable
";

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

// ========== Analyze Command Tests ==========

#[tokio::test]
async fn test_run_analysis() {
    let csv = write_temp(SAMPLE_CSV);
    let config = write_temp("[report]\ncurrency_symbol = \"$\"\n");

    let output = commands::run_analysis(
        Some(config.path()),
        csv.path(),
        &AnalysisContext::default(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(output.batch.raw_rows, 7);
    assert_eq!(output.batch.dropped.len(), 1);
    assert_eq!(output.summary.categories["Housing"].sum, 2400.0);
    assert_eq!(output.report.chart_data.len(), 4);
    assert!(output
        .report
        .prediction_message
        .starts_with("Next month forecast: 1,100.00$"));
}

#[tokio::test]
async fn test_run_analysis_with_mock_ai() {
    let csv = write_temp(SAMPLE_CSV);
    let config = write_temp("");

    let output = commands::run_analysis(
        Some(config.path()),
        csv.path(),
        &AnalysisContext::new(Some("retail".into()), None),
        Some(AIClient::mock()),
    )
    .await
    .unwrap();

    match output.report.narrative {
        Narrative::Structured(a) => assert!(a.patterns.iter().any(|p| p.contains("retail"))),
        other => panic!("expected structured narrative, got {:?}", other),
    }
}

#[tokio::test]
async fn test_run_analysis_missing_file() {
    let config = write_temp("");
    let result = commands::run_analysis(
        Some(config.path()),
        std::path::Path::new("/nonexistent/expenses.csv"),
        &AnalysisContext::default(),
        None,
    )
    .await;

    let err = result.err().unwrap();
    assert!(err.to_string().contains("Failed to open"));
}

#[tokio::test]
async fn test_run_analysis_schema_error() {
    let csv = write_temp("date,amount\n2024-01-01,10\n");
    let config = write_temp("");

    let result = commands::run_analysis(
        Some(config.path()),
        csv.path(),
        &AnalysisContext::default(),
        None,
    )
    .await;

    let err = result.err().unwrap();
    let chain = format!("{:#}", err);
    assert!(chain.contains("Missing required columns"));
    assert!(chain.contains("category"));
}

#[tokio::test]
async fn test_cmd_analyze_json_without_ai() {
    let csv = write_temp(SAMPLE_CSV);
    let config = write_temp("");
    let result = commands::cmd_analyze(
        Some(config.path()),
        csv.path(),
        None,
        None,
        true,
        None,
    )
    .await;
    assert!(result.is_ok());
}

#[test]
fn test_model_override() {
    let ollama = Some(AIClient::ollama("http://localhost:11434", "llama3.2"));

    let overridden = commands::with_model_override(ollama.clone(), Some("gemma3")).unwrap();
    assert_eq!(overridden.model(), "gemma3");

    let kept = commands::with_model_override(ollama, Some("  ")).unwrap();
    assert_eq!(kept.model(), "llama3.2");

    assert!(commands::with_model_override(None, Some("gemma3")).is_none());
}

// ========== Config Command Tests ==========

#[test]
fn test_config_toml_reflects_overrides() {
    let config = write_temp("[forecast]\nwindow = 4\n");
    let toml = commands::config_toml(Some(config.path())).unwrap();

    assert!(toml.contains("window = 4"));
    assert!(toml.contains("z_score = 1.96"));
    assert!(toml.contains("[narrative.fallback]"));
}

#[test]
fn test_config_rejects_invalid_file() {
    let config = write_temp("[forecast]\nwindow = 0\n");
    assert!(commands::config_toml(Some(config.path())).is_err());
}

// ========== Serve Command Tests ==========

#[test]
fn test_resolve_port_prefers_flag() {
    assert_eq!(commands::resolve_port(Some(9000)).unwrap(), 9000);
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("Food", 10), "Food");
    assert_eq!(truncate("Entertainment and leisure", 10), "Enterta...");
    assert_eq!(truncate("Alimentación básica", 8), "Alime...");
}
