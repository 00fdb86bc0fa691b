//! Category and expense-type profiling
//!
//! Groups validated transactions by category and by expense type and derives
//! the top-line totals shown alongside the forecast.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{
    CategoryStat, MonthlySeries, SpendingSummary, SummaryStats, TopCategory, Transaction, TypeStat,
};

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Breakdown plus top-line stats for one batch
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingProfile {
    pub summary: SpendingSummary,
    pub stats: SummaryStats,
}

/// Build the category/type breakdown and summary stats
///
/// `series` must be the monthly aggregation of the same transactions.
pub fn profile(transactions: &[Transaction], series: &MonthlySeries) -> Result<SpendingProfile> {
    if transactions.is_empty() || series.is_empty() {
        return Err(Error::NoValidRows { raw_rows: 0 });
    }

    let summary = summarize(transactions);
    let top_category = top_category(&summary.categories)
        .ok_or_else(|| Error::Computation("no category to rank".into()))?;

    let total: f64 = transactions.iter().map(|tx| tx.amount).sum();
    if !total.is_finite() {
        return Err(Error::Computation(format!("total spend is {}", total)));
    }

    // Non-empty series, checked above
    let stats = SummaryStats {
        total,
        monthly_average: series.mean().unwrap_or_default(),
        monthly_max: series.max().unwrap_or_default(),
        monthly_min: series.min().unwrap_or_default(),
        transaction_count: transactions.len(),
        category_count: summary.categories.len(),
        expense_type_count: summary.expense_types.len(),
        top_category,
    };

    Ok(SpendingProfile { summary, stats })
}

/// Group by category (sum/mean/count) and by expense type (sum)
pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    let mut by_category: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    let mut by_type: BTreeMap<String, f64> = BTreeMap::new();

    for tx in transactions {
        let entry = by_category.entry(tx.category.clone()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
        *by_type.entry(tx.expense_type.clone()).or_insert(0.0) += tx.amount;
    }

    let categories = by_category
        .into_iter()
        .map(|(name, (sum, count))| {
            let stat = CategoryStat {
                sum: round2(sum),
                mean: round2(sum / count as f64),
                count,
            };
            (name, stat)
        })
        .collect();

    let expense_types = by_type
        .into_iter()
        .map(|(name, sum)| (name, TypeStat { sum: round2(sum) }))
        .collect();

    SpendingSummary {
        categories,
        expense_types,
    }
}

/// Category with the largest rounded sum; ties go to the alphabetically first
pub fn top_category(categories: &BTreeMap<String, CategoryStat>) -> Option<TopCategory> {
    let mut best: Option<(&String, &CategoryStat)> = None;
    for (name, stat) in categories {
        match best {
            Some((_, b)) if stat.sum <= b.sum => {}
            _ => best = Some((name, stat)),
        }
    }

    best.map(|(name, stat)| TopCategory {
        name: name.clone(),
        total: stat.sum,
        average: stat.mean,
    })
}
