//! Report assembly
//!
//! Runs the numeric pipeline (aggregate, profile, forecast) and then asks the
//! text-analysis backend for commentary. The numbers are final before the
//! backend is called; any backend failure is replaced by the configured
//! fallback narrative.

use std::io::Read;

use tracing::{debug, info, warn};

use crate::aggregate::aggregate_monthly;
use crate::ai::{AIClient, AnalysisContext, Narrative, TextAnalysisProvider};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::forecast::ForecastEstimator;
use crate::import::parse_csv;
use crate::models::{
    AnalysisReport, ChartPoint, ForecastResult, SpendingSummary, Transaction,
};
use crate::profile::profile;

/// Builds `AnalysisReport`s with an optional text-analysis backend
#[derive(Clone)]
pub struct ReportAssembler {
    config: AnalysisConfig,
    estimator: ForecastEstimator,
    ai: Option<AIClient>,
}

impl ReportAssembler {
    pub fn new(config: AnalysisConfig, ai: Option<AIClient>) -> Self {
        let estimator = ForecastEstimator::new(config.forecast.clone());
        Self {
            config,
            estimator,
            ai,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn ai(&self) -> Option<&AIClient> {
        self.ai.as_ref()
    }

    /// Parse a CSV upload and assemble its report
    pub async fn analyze_csv<R: Read>(
        &self,
        reader: R,
        context: &AnalysisContext,
    ) -> Result<AnalysisReport> {
        let batch = parse_csv(reader)?;
        self.assemble(&batch.transactions, context).await
    }

    /// Assemble the report for validated transactions
    pub async fn assemble(
        &self,
        transactions: &[Transaction],
        context: &AnalysisContext,
    ) -> Result<AnalysisReport> {
        let (report, _) = self.assemble_with_summary(transactions, context).await?;
        Ok(report)
    }

    /// Like `assemble`, also handing back the category and expense-type
    /// breakdown the narrative was built from
    pub async fn assemble_with_summary(
        &self,
        transactions: &[Transaction],
        context: &AnalysisContext,
    ) -> Result<(AnalysisReport, SpendingSummary)> {
        let series = aggregate_monthly(transactions);
        let profile = profile(transactions, &series)?;
        let prediction = self.estimator.estimate(&series)?;

        let last_month = series.last_month().ok_or(Error::EmptySeries)?;
        let mut chart_data: Vec<ChartPoint> = series
            .iter()
            .map(|(month, amount)| ChartPoint::observed(month, amount))
            .collect();
        chart_data.push(ChartPoint::predicted(last_month.next(), &prediction));

        info!(
            months = series.len(),
            transactions = transactions.len(),
            predicted = prediction.predicted_amount,
            "Forecast computed"
        );

        let prediction_message =
            prediction_message(&prediction, &self.config.report.currency_symbol);
        let narrative = self.narrative(&profile.summary, context).await;

        let report = AnalysisReport {
            chart_data,
            prediction,
            stats: profile.stats,
            narrative,
            prediction_message,
        };
        Ok((report, profile.summary))
    }

    /// Commentary from the backend, or the fallback on any failure
    async fn narrative(&self, summary: &SpendingSummary, context: &AnalysisContext) -> Narrative {
        let fallback = || Narrative::Structured(self.config.narrative.fallback.clone());

        let Some(ai) = &self.ai else {
            debug!("No AI backend configured, using fallback narrative");
            return fallback();
        };

        let context = context
            .clone()
            .with_language(&self.config.narrative.language);
        let timeout = self.config.narrative.timeout();

        let result = match tokio::time::timeout(timeout, ai.analyze_spending(summary, &context))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout.as_secs())),
        };

        match result {
            Ok(narrative) => narrative,
            Err(e) => {
                warn!(
                    host = ai.host(),
                    model = ai.model(),
                    "Narrative generation failed, using fallback: {}",
                    e
                );
                fallback()
            }
        }
    }
}

/// Three-line human-readable forecast summary
pub fn prediction_message(prediction: &ForecastResult, currency: &str) -> String {
    format!(
        "Next month forecast: {}\nConfidence level: {:.1}%\nExpected range: {} - {}",
        format_amount(prediction.predicted_amount, currency),
        prediction.confidence_level * 100.0,
        format_amount(prediction.lower_bound, currency),
        format_amount(prediction.upper_bound, currency),
    )
}

/// `1234.5` -> `1,234.50€`
pub fn format_amount(value: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}{}", sign, grouped, frac_part, currency)
}
