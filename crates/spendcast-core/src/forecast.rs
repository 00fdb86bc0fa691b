//! Next-month spend forecast
//!
//! The point estimate is the mean of the most recent months (the base
//! window). Its spread drives both the confidence level and a symmetric
//! interval:
//!
//! - `confidence = clamp(1 - std_dev / predicted, min, max)`
//! - `margin = std_dev * z_score`, with a fixed z-score regardless of the
//!   reported confidence (a normal approximation, not an exact interval)
//! - `lower = max(0, predicted - margin)`, `upper = max(lower, predicted + margin)`
//!
//! A net-negative window (refunds outweighing spend) keeps its negative
//! point estimate, but the interval never drops below zero.
//!
//! The trend label comes from the mean month-over-month change across the
//! whole series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ForecastResult, MonthlySeries, Trend};

/// Tunable constants of the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastPolicy {
    /// Number of most recent months averaged for the point estimate
    pub window: usize,
    /// Interval half-width multiplier applied to the standard deviation
    pub z_score: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Base prediction used when there is no history to average
    pub fallback_prediction: f64,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            window: 3,
            z_score: 1.96,
            min_confidence: 0.50,
            max_confidence: 0.95,
            fallback_prediction: 1000.0,
        }
    }
}

impl ForecastPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::Config("forecast.window must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) || !(0.0..=1.0).contains(&self.max_confidence)
        {
            return Err(Error::Config(
                "forecast confidence limits must be within [0, 1]".into(),
            ));
        }
        if self.min_confidence > self.max_confidence {
            return Err(Error::Config(format!(
                "forecast.min_confidence ({}) exceeds forecast.max_confidence ({})",
                self.min_confidence, self.max_confidence
            )));
        }
        if !self.z_score.is_finite() || self.z_score < 0.0 {
            return Err(Error::Config("forecast.z_score must be non-negative".into()));
        }
        Ok(())
    }
}

/// Produces a one-step-ahead forecast from a monthly series
#[derive(Debug, Clone, Default)]
pub struct ForecastEstimator {
    policy: ForecastPolicy,
}

impl ForecastEstimator {
    pub fn new(policy: ForecastPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Forecast the month after the last observed one
    ///
    /// Fails with `Error::EmptySeries` when there is nothing to forecast from.
    pub fn estimate(&self, series: &MonthlySeries) -> Result<ForecastResult> {
        let values = series.values();
        if values.is_empty() {
            return Err(Error::EmptySeries);
        }

        let window_start = values.len().saturating_sub(self.policy.window.max(1));
        let window = &values[window_start..];

        let mut predicted = mean(window);
        let std_dev = sample_std_dev(window);

        if predicted == 0.0 {
            predicted = self.rebase(&values);
        }

        let variation_coefficient = if predicted != 0.0 {
            std_dev / predicted
        } else {
            0.0
        };
        let confidence_level = (1.0 - variation_coefficient)
            .min(self.policy.max_confidence)
            .max(self.policy.min_confidence);

        let margin_of_error = std_dev * self.policy.z_score;
        let lower_bound = (predicted - margin_of_error).max(0.0);
        let upper_bound = (predicted + margin_of_error).max(lower_bound);

        for (name, value) in [
            ("predicted amount", predicted),
            ("standard deviation", std_dev),
            ("upper bound", upper_bound),
        ] {
            if !value.is_finite() {
                return Err(Error::Computation(format!("{} is {}", name, value)));
            }
        }

        let result = ForecastResult {
            predicted_amount: predicted,
            confidence_level,
            lower_bound,
            upper_bound,
            trend: trend(&values),
            std_dev,
            base_window: window.len(),
        };
        debug!("Forecast computed: {:?}", result);
        Ok(result)
    }

    /// Replacement base prediction when the window averages to zero
    pub fn rebase(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            self.policy.fallback_prediction
        } else {
            mean(values)
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation; 0 for fewer than two values
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Month-over-month fractional changes; the first month's change is 0
///
/// A change from zero to zero counts as 0; from zero to anything else it is
/// infinite and dominates the mean.
pub fn month_over_month_changes(values: &[f64]) -> Vec<f64> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }
    changes.push(0.0);
    for pair in values.windows(2) {
        let change = (pair[1] - pair[0]) / pair[0];
        changes.push(if change.is_nan() { 0.0 } else { change });
    }
    changes
}

/// Increasing iff the mean month-over-month change is strictly positive
pub fn trend(values: &[f64]) -> Trend {
    if mean(&month_over_month_changes(values)) > 0.0 {
        Trend::Increasing
    } else {
        Trend::Decreasing
    }
}
