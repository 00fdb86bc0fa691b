//! Spendcast Core Library
//!
//! Shared functionality for the Spendcast expense analyzer:
//! - CSV import with per-row validation
//! - Monthly aggregation and category profiling
//! - Next-month forecast with a confidence interval
//! - Pluggable AI backends (Ollama, OpenAI-compatible) for narrative commentary
//! - Report assembly with a fallback narrative
//! - TOML configuration with a data-dir override

pub mod aggregate;
pub mod ai;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod profile;
pub mod prompts;
pub mod report;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, AnalysisContext, MockBackend, MockBehavior, Narrative, NarrativeAnalysis,
    OllamaBackend, OpenAICompatibleBackend, TextAnalysisProvider,
};
pub use config::{AnalysisConfig, NarrativeConfig, ReportConfig};
pub use error::{Error, Result};
pub use forecast::{ForecastEstimator, ForecastPolicy};
pub use import::{parse_csv, DropReason, DroppedRow, ValidatedBatch};
pub use models::{
    AnalysisReport, CategoryStat, ChartPoint, ForecastResult, MonthKey, MonthlySeries,
    SpendingSummary, SummaryStats, TopCategory, Transaction, Trend, TypeStat,
};
pub use prompts::Prompt;
pub use report::ReportAssembler;
