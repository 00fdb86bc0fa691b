//! Domain models for Spendcast

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ai::Narrative;

/// A validated expense transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub category: String,
    pub concept: String,
    pub amount: f64,
    pub expense_type: String,
}

impl Transaction {
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }
}

/// Year-month grouping key, rendered as `YYYY-MM`
///
/// Ordering is chronological, which for this format is also lexicographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns None unless `month` is in 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The calendar month immediately after this one
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month key: {}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month key: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month in month key: {}", s))?;
        Self::new(year, month).ok_or_else(|| format!("Month out of range: {}", s))
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Total spend per month, in chronological order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    totals: BTreeMap<MonthKey, f64>,
}

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an amount to a month's running total
    pub fn add(&mut self, month: MonthKey, amount: f64) {
        *self.totals.entry(month).or_insert(0.0) += amount;
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn get(&self, month: MonthKey) -> Option<f64> {
        self.totals.get(&month).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonthKey, f64)> + '_ {
        self.totals.iter().map(|(k, v)| (*k, *v))
    }

    pub fn months(&self) -> Vec<MonthKey> {
        self.totals.keys().copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.totals.values().copied().collect()
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.totals.keys().next_back().copied()
    }

    pub fn total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.total() / self.len() as f64)
        }
    }

    pub fn max(&self) -> Option<f64> {
        self.totals.values().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.totals.values().copied().reduce(f64::min)
    }
}

impl FromIterator<(MonthKey, f64)> for MonthlySeries {
    fn from_iter<I: IntoIterator<Item = (MonthKey, f64)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (month, amount) in iter {
            series.add(month, amount);
        }
        series
    }
}

/// Aggregates for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub sum: f64,
    pub mean: f64,
    pub count: usize,
}

/// Aggregates for one expense type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeStat {
    pub sum: f64,
}

/// Category with the highest total spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCategory {
    pub name: String,
    pub total: f64,
    pub average: f64,
}

/// Top-line totals for a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: f64,
    pub monthly_average: f64,
    pub monthly_max: f64,
    pub monthly_min: f64,
    pub transaction_count: usize,
    pub category_count: usize,
    pub expense_type_count: usize,
    pub top_category: TopCategory,
}

/// Per-category and per-expense-type breakdown, keyed alphabetically
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub categories: BTreeMap<String, CategoryStat>,
    pub expense_types: BTreeMap<String, TypeStat>,
}

/// Direction of month-over-month spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-month spend forecast with a symmetric interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_amount: f64,
    pub confidence_level: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub trend: Trend,
    /// Sample standard deviation of the base window
    #[serde(skip)]
    pub std_dev: f64,
    /// Number of months the point estimate was averaged over
    #[serde(skip)]
    pub base_window: usize,
}

/// One point of the chart series; the last one carries the forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub month: MonthKey,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_prediction: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
}

impl ChartPoint {
    pub fn observed(month: MonthKey, amount: f64) -> Self {
        Self {
            month,
            amount,
            is_prediction: false,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn predicted(month: MonthKey, forecast: &ForecastResult) -> Self {
        Self {
            month,
            amount: forecast.predicted_amount,
            is_prediction: true,
            lower_bound: Some(forecast.lower_bound),
            upper_bound: Some(forecast.upper_bound),
        }
    }
}

/// Full result of analyzing one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub chart_data: Vec<ChartPoint>,
    pub prediction: ForecastResult,
    pub stats: SummaryStats,
    pub narrative: Narrative,
    pub prediction_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_month_key_display_and_parse() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap());
        assert_eq!(key.to_string(), "2024-03");
        assert_eq!(month("2024-03"), key);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_next_rolls_over_year() {
        assert_eq!(month("2024-03").next(), month("2024-04"));
        assert_eq!(month("2023-12").next(), month("2024-01"));
    }

    #[test]
    fn test_month_key_ordering_is_chronological() {
        let mut keys = vec![month("2024-01"), month("2023-12"), month("2023-02")];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2023-02", "2023-12", "2024-01"]);
    }

    #[test]
    fn test_monthly_series_stats() {
        let series: MonthlySeries = vec![
            (month("2024-02"), 1200.0),
            (month("2024-01"), 1000.0),
            (month("2024-03"), 1100.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(series.values(), vec![1000.0, 1200.0, 1100.0]);
        assert_eq!(series.last_month(), Some(month("2024-03")));
        assert_eq!(series.total(), 3300.0);
        assert_eq!(series.mean(), Some(1100.0));
        assert_eq!(series.max(), Some(1200.0));
        assert_eq!(series.min(), Some(1000.0));
    }

    #[test]
    fn test_empty_series_has_no_stats() {
        let series = MonthlySeries::new();
        assert!(series.is_empty());
        assert_eq!(series.mean(), None);
        assert_eq!(series.max(), None);
        assert_eq!(series.last_month(), None);
    }

    #[test]
    fn test_chart_point_serialization() {
        let observed = ChartPoint::observed(month("2024-01"), 10.5);
        let json = serde_json::to_value(&observed).unwrap();
        assert_eq!(json, serde_json::json!({"month": "2024-01", "amount": 10.5}));

        let forecast = ForecastResult {
            predicted_amount: 100.0,
            confidence_level: 0.9,
            lower_bound: 80.0,
            upper_bound: 120.0,
            trend: Trend::Increasing,
            std_dev: 10.2,
            base_window: 3,
        };
        let predicted = ChartPoint::predicted(month("2024-02"), &forecast);
        let json = serde_json::to_value(&predicted).unwrap();
        assert_eq!(json["isPrediction"], true);
        assert_eq!(json["lowerBound"], 80.0);
        assert_eq!(json["upperBound"], 120.0);
    }

    #[test]
    fn test_forecast_serializes_only_public_fields() {
        let forecast = ForecastResult {
            predicted_amount: 500.0,
            confidence_level: 0.95,
            lower_bound: 500.0,
            upper_bound: 500.0,
            trend: Trend::Decreasing,
            std_dev: 0.0,
            base_window: 1,
        };
        let json = serde_json::to_value(&forecast).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(json["trend"], "decreasing");
    }
}
