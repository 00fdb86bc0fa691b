//! Monthly aggregation

use tracing::debug;

use crate::models::{MonthlySeries, Transaction};

/// Sum transaction amounts per calendar month
pub fn aggregate_monthly(transactions: &[Transaction]) -> MonthlySeries {
    let series: MonthlySeries = transactions
        .iter()
        .map(|tx| (tx.month(), tx.amount))
        .collect();

    debug!(
        "Monthly totals: {:?}",
        series
            .iter()
            .map(|(m, v)| format!("{}={:.2}", m, v))
            .collect::<Vec<_>>()
    );
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(date: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            category: "Food".into(),
            concept: "test".into(),
            amount,
            expense_type: "variable".into(),
        }
    }

    #[test]
    fn test_groups_by_month_in_chronological_order() {
        let transactions = vec![
            tx("2024-03-02", 50.0),
            tx("2024-01-15", 100.0),
            tx("2024-01-31", 25.5),
            tx("2023-12-24", 10.0),
            tx("2024-03-28", 50.0),
        ];
        let series = aggregate_monthly(&transactions);

        let months: Vec<String> = series.months().iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-03"]);
        assert_eq!(series.values(), vec![10.0, 125.5, 100.0]);
    }

    #[test]
    fn test_negative_amounts_offset_spend() {
        let series = aggregate_monthly(&[tx("2024-01-01", 80.0), tx("2024-01-10", -30.0)]);
        assert_eq!(series.values(), vec![50.0]);
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        assert!(aggregate_monthly(&[]).is_empty());
    }
}
