//! Mock backend for testing
//!
//! Derives a predictable narrative from the summary it is given.
//! Useful for unit tests and development without a running LLM server.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::SpendingSummary;

use super::parsing::parse_narrative;
use super::types::{AnalysisContext, Narrative, NarrativeAnalysis};
use super::TextAnalysisProvider;

/// How the mock answers `analyze_spending`
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MockBehavior {
    /// Narrative built from the summary
    #[default]
    Summary,
    /// Fixed raw response, run through the normal parser
    Raw(String),
    /// Always fail
    Fail,
    /// Sleep before answering from the summary
    Delay(Duration),
}

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    pub behavior: MockBehavior,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            behavior: MockBehavior::Summary,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            behavior: MockBehavior::Fail,
        }
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            healthy: true,
            behavior,
        }
    }

    /// Create a new instance with a different model (no-op for mock)
    pub fn with_model(&self, _model: &str) -> Self {
        self.clone()
    }
}

/// Deterministic commentary from the category and type breakdown
fn summary_narrative(summary: &SpendingSummary, context: &AnalysisContext) -> NarrativeAnalysis {
    let mut by_sum: Vec<_> = summary.categories.iter().collect();
    by_sum.sort_by(|a, b| b.1.sum.total_cmp(&a.1.sum).then_with(|| a.0.cmp(b.0)));

    let mut patterns: Vec<String> = by_sum
        .iter()
        .take(3)
        .map(|(name, stat)| {
            format!(
                "{} accounts for {:.2} across {} transactions",
                name, stat.sum, stat.count
            )
        })
        .collect();
    if let Some(sector) = &context.sector {
        patterns.push(format!("Spending profile evaluated for the {} sector", sector));
    }

    let anomalies = summary
        .categories
        .iter()
        .filter(|(_, stat)| stat.count == 1)
        .map(|(name, stat)| format!("{} has a single transaction of {:.2}", name, stat.sum))
        .take(2)
        .collect();

    let mut recommendations = Vec::new();
    if let Some((name, _)) = by_sum.first() {
        recommendations.push(format!("Review spending in {}", name));
    }
    if let Some((name, stat)) = summary
        .expense_types
        .iter()
        .max_by(|a, b| a.1.sum.total_cmp(&b.1.sum))
    {
        recommendations.push(format!(
            "Track {} expenses, which total {:.2}",
            name, stat.sum
        ));
    }

    NarrativeAnalysis {
        patterns,
        anomalies,
        recommendations,
    }
}

#[async_trait]
impl TextAnalysisProvider for MockBackend {
    async fn analyze_spending(
        &self,
        summary: &SpendingSummary,
        context: &AnalysisContext,
    ) -> Result<Narrative> {
        match &self.behavior {
            MockBehavior::Summary => Ok(summary_narrative(summary, context).into()),
            MockBehavior::Raw(response) => parse_narrative(response),
            MockBehavior::Fail => Err(Error::InvalidData("Mock backend failure".into())),
            MockBehavior::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(summary_narrative(summary, context).into())
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
