//! Analyze command implementation

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{
    import::parse_csv, AIClient, AnalysisContext, AnalysisReport, Narrative,
    ReportAssembler, SpendingSummary, ValidatedBatch,
};

use super::{load_config, truncate};

/// Everything the analyze command prints
pub struct AnalysisOutput {
    pub batch: ValidatedBatch,
    pub summary: SpendingSummary,
    pub report: AnalysisReport,
}

/// Run the pipeline on a CSV file
pub async fn run_analysis(
    config_path: Option<&Path>,
    file: &Path,
    context: &AnalysisContext,
    ai: Option<AIClient>,
) -> Result<AnalysisOutput> {
    let config = load_config(config_path)?;

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let batch = parse_csv(reader).with_context(|| format!("Failed to read {}", file.display()))?;

    let assembler = ReportAssembler::new(config, ai);
    let (report, summary) = assembler
        .assemble_with_summary(&batch.transactions, context)
        .await
        .context("Analysis failed")?;

    Ok(AnalysisOutput {
        batch,
        summary,
        report,
    })
}

pub async fn cmd_analyze(
    config_path: Option<&Path>,
    file: &Path,
    sector: Option<String>,
    region: Option<String>,
    json: bool,
    ai: Option<AIClient>,
) -> Result<()> {
    let context = AnalysisContext::new(sector, region);

    let output = run_analysis(config_path, file, &context, ai).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&output.report)?);
        return Ok(());
    }

    print_report(file, &output);
    Ok(())
}

fn print_report(file: &Path, output: &AnalysisOutput) {
    let report = &output.report;
    let stats = &report.stats;

    println!();
    println!("📊 Spending Analysis");
    println!("   File: {}", file.display());
    println!(
        "   Rows: {} read, {} used",
        output.batch.raw_rows,
        output.batch.transactions.len()
    );
    if !output.batch.dropped.is_empty() {
        println!("   ⚠️  {} rows dropped:", output.batch.dropped.len());
        for dropped in output.batch.dropped.iter().take(5) {
            println!("      row {}: {}", dropped.row, dropped.reason);
        }
        if output.batch.dropped.len() > 5 {
            println!("      ... and {} more", output.batch.dropped.len() - 5);
        }
    }
    println!("   ─────────────────────────────────────────────────────────────");

    println!();
    println!("   {:10} │ {:>12} │", "Month", "Amount");
    println!("   ───────────┼──────────────┼──────────────────────────");
    for point in &report.chart_data {
        if point.is_prediction {
            println!(
                "   {:10} │ {:>12.2} │ forecast ({:.2} - {:.2})",
                point.month.to_string(),
                point.amount,
                point.lower_bound.unwrap_or_default(),
                point.upper_bound.unwrap_or_default()
            );
        } else {
            println!("   {:10} │ {:>12.2} │", point.month.to_string(), point.amount);
        }
    }

    println!();
    println!(
        "   {:25} │ {:>12} │ {:>10} │ {:>5}",
        "Category", "Total", "Average", "Count"
    );
    println!("   ──────────────────────────┼──────────────┼────────────┼───────");
    let mut categories: Vec<_> = output.summary.categories.iter().collect();
    categories.sort_by(|a, b| b.1.sum.total_cmp(&a.1.sum));
    for (name, stat) in categories {
        println!(
            "   {:25} │ {:>12.2} │ {:>10.2} │ {:>5}",
            truncate(name, 25),
            stat.sum,
            stat.mean,
            stat.count
        );
    }

    println!();
    println!("   Total:           {:.2}", stats.total);
    println!("   Monthly average: {:.2}", stats.monthly_average);
    println!(
        "   Monthly range:   {:.2} - {:.2}",
        stats.monthly_min, stats.monthly_max
    );
    println!(
        "   Top category:    {} ({:.2})",
        stats.top_category.name, stats.top_category.total
    );
    println!("   Trend:           {}", report.prediction.trend);

    println!();
    println!("🔮 Forecast");
    for line in report.prediction_message.lines() {
        println!("   {}", line);
    }

    println!();
    println!("💬 Narrative");
    match &report.narrative {
        Narrative::Structured(analysis) => {
            print_section("Patterns", &analysis.patterns);
            print_section("Anomalies", &analysis.anomalies);
            print_section("Recommendations", &analysis.recommendations);
        }
        Narrative::Text(text) => {
            for line in text.lines() {
                println!("   {}", line);
            }
        }
    }
    println!();
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("   {}:", title);
    for item in items {
        println!("   • {}", item);
    }
}
