//! Integration tests for spendcast-core
//!
//! These tests exercise the full import → aggregate → forecast → report workflow.

use spendcast_core::{
    aggregate::aggregate_monthly,
    import::{parse_csv, DropReason},
    AIClient, AnalysisConfig, AnalysisContext, Error, MockBehavior, MonthKey, Narrative,
    ReportAssembler, Trend,
};

/// Six months of household expenses, with one bad amount and one bad date
fn household_csv() -> &'static str {
    r#"date,category,concept,amount,expense_type,notes
2024-01-03,Housing,Rent,900.00,fixed,
2024-01-12,Food,Supermarket,210.40,variable,weekly shop
2024-01-25,Utilities,Electricity,64.10,fixed,
2024-02-03,Housing,Rent,900.00,fixed,
2024-02-14,Food,Restaurant,N/A,variable,missing receipt
2024-02-15,Food,Supermarket,190.00,variable,
2024-02-26,Utilities,Electricity,58.90,fixed,
2024-03-03,Housing,Rent,900.00,fixed,
2024-03-09,Leisure,Concert,120.00,variable,
2024-03-16,Food,Supermarket,230.50,variable,
2024-13-40,Food,Supermarket,50.00,variable,bad date
2024-04-03,Housing,Rent,900.00,fixed,
2024-04-19,Food,Supermarket,205.75,variable,
2024-05-03,Housing,Rent,950.00,fixed,
2024-05-20,Food,Supermarket,240.00,variable,
2024-05-28,Utilities,Electricity,71.30,fixed,
2024-06-03,Housing,Rent,950.00,fixed,
2024-06-11,Food,Supermarket,260.00,variable,
2024-06-21,Leisure,Cinema,24.00,variable,"#
}

// =============================================================================
// Import
// =============================================================================

#[test]
fn test_import_drops_invalid_rows() {
    let batch = parse_csv(household_csv().as_bytes()).expect("Failed to parse CSV");

    assert_eq!(batch.raw_rows, 19);
    assert_eq!(batch.transactions.len(), 17);
    assert_eq!(batch.dropped.len(), 2);
    assert_eq!(batch.dropped[0].row, 5);
    assert_eq!(
        batch.dropped[0].reason,
        DropReason::InvalidAmount("N/A".to_string())
    );
    assert!(matches!(batch.dropped[1].reason, DropReason::InvalidDate(_)));
}

#[test]
fn test_import_reports_missing_columns() {
    let csv = "date,category,amount\n2024-01-01,Food,10\n";
    match parse_csv(csv.as_bytes()) {
        Err(Error::Schema { missing }) => {
            assert_eq!(missing, vec!["concept", "expense_type"]);
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_aggregation_is_chronological() {
    let batch = parse_csv(household_csv().as_bytes()).unwrap();
    let series = aggregate_monthly(&batch.transactions);

    let months: Vec<String> = series.months().iter().map(|m| m.to_string()).collect();
    assert_eq!(
        months,
        vec!["2024-01", "2024-02", "2024-03", "2024-04", "2024-05", "2024-06"]
    );
    assert!((series.get(MonthKey::new(2024, 2).unwrap()).unwrap() - 1148.9).abs() < 1e-9);
}

// =============================================================================
// Report Workflow
// =============================================================================

#[tokio::test]
async fn test_full_report_workflow() {
    let assembler = ReportAssembler::new(AnalysisConfig::default(), Some(AIClient::mock()));
    let context = AnalysisContext::new(Some("household".into()), Some("Valencia".into()));

    let report = assembler
        .analyze_csv(household_csv().as_bytes(), &context)
        .await
        .expect("Failed to build report");

    // Six observed months plus the forecast
    assert_eq!(report.chart_data.len(), 7);
    let forecast_point = report.chart_data.last().unwrap();
    assert!(forecast_point.is_prediction);
    assert_eq!(forecast_point.month.to_string(), "2024-07");

    // Base window is April..June: 1105.75, 1261.30, 1234.00
    let expected = (1105.75 + 1261.30 + 1234.00) / 3.0;
    let prediction = &report.prediction;
    assert!((prediction.predicted_amount - expected).abs() < 1e-9);
    assert!(prediction.lower_bound <= prediction.predicted_amount);
    assert!(prediction.predicted_amount <= prediction.upper_bound);
    assert!((0.5..=0.95).contains(&prediction.confidence_level));
    assert_eq!(prediction.trend, Trend::Increasing);

    let stats = &report.stats;
    assert_eq!(stats.transaction_count, 17);
    assert_eq!(stats.category_count, 4);
    assert_eq!(stats.expense_type_count, 2);
    assert_eq!(stats.top_category.name, "Housing");
    assert_eq!(stats.top_category.total, 5500.0);

    match &report.narrative {
        Narrative::Structured(analysis) => {
            assert!(analysis
                .patterns
                .iter()
                .any(|p| p.contains("household")));
        }
        other => panic!("expected structured narrative, got {:?}", other),
    }

    assert!(report.prediction_message.starts_with("Next month forecast: 1,"));
    assert!(report.prediction_message.contains("Confidence level: "));
}

#[tokio::test]
async fn test_report_survives_backend_failure() {
    let healthy = ReportAssembler::new(AnalysisConfig::default(), None);
    let failing = ReportAssembler::new(
        AnalysisConfig::default(),
        Some(AIClient::mock_with(MockBehavior::Fail)),
    );
    let context = AnalysisContext::default();

    let a = healthy
        .analyze_csv(household_csv().as_bytes(), &context)
        .await
        .unwrap();
    let b = failing
        .analyze_csv(household_csv().as_bytes(), &context)
        .await
        .unwrap();

    assert_eq!(a.prediction, b.prediction);
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.chart_data, b.chart_data);
    assert_eq!(
        b.narrative,
        Narrative::Structured(AnalysisConfig::default().narrative.fallback)
    );
}

#[tokio::test]
async fn test_config_changes_forecast_window() {
    let config = AnalysisConfig::from_toml_str("[forecast]\nwindow = 6\n").unwrap();
    let assembler = ReportAssembler::new(config, None);

    let report = assembler
        .analyze_csv(household_csv().as_bytes(), &AnalysisContext::default())
        .await
        .unwrap();

    let expected = report.stats.total / 6.0;
    assert!((report.prediction.predicted_amount - expected).abs() < 1e-9);
}

#[tokio::test]
async fn test_report_rejects_unusable_upload() {
    let assembler = ReportAssembler::new(AnalysisConfig::default(), None);
    let csv = "date,category,concept,amount,expense_type\nnot-a-date,Food,x,10,variable\n";

    let err = assembler
        .analyze_csv(csv.as_bytes(), &AnalysisContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoValidRows { raw_rows: 1 }));
    assert!(err.is_client_error());
}

#[cfg(feature = "test-utils")]
#[tokio::test]
async fn test_report_with_mock_ollama_server() {
    use spendcast_core::test_utils::MockOllamaServer;

    let server = MockOllamaServer::start().await;
    let assembler = ReportAssembler::new(
        AnalysisConfig::default(),
        Some(AIClient::ollama(&server.url(), "llama3.2")),
    );

    let report = assembler
        .analyze_csv(household_csv().as_bytes(), &AnalysisContext::default())
        .await
        .unwrap();

    match report.narrative {
        Narrative::Structured(analysis) => {
            assert_eq!(analysis.patterns.len(), 3);
            assert!(analysis.patterns[0].contains("Food"));
        }
        other => panic!("expected structured narrative, got {:?}", other),
    }
}
