use crate::routes::InsightResponse;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use waste_insights::config::AppConfig;
use waste_insights::error::AppError;
use waste_insights::insights::{Insight, InsightEngine, MetricValue};
use waste_insights::records::{ContributorImporter, RecordImporter};
use waste_insights::summary::{CollectionSummary, WasteCatalog};
use waste_insights::telemetry;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Collection records export (.csv or .json)
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Optional leaderboard export (.csv or .json)
    #[arg(long)]
    pub(crate) contributors: Option<PathBuf>,
    /// Optional waste-type catalog (.json) with prices and recyclable flags
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Reference date for the monthly window (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) now: Option<NaiveDate>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        records,
        contributors,
        catalog,
        now,
        json,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init_stderr(&config.telemetry)?;
    let engine = InsightEngine::new(config.insights)?;

    let records = RecordImporter::from_path(&records)?;
    let contributors = match contributors {
        Some(path) => ContributorImporter::from_path(path)?,
        None => Vec::new(),
    };
    let catalog = match catalog {
        Some(path) => load_catalog(path)?,
        None => WasteCatalog::default(),
    };
    let now = now.unwrap_or_else(|| Local::now().date_naive());

    let (response, _) = InsightResponse::assemble(&engine, &records, &contributors, &catalog, now);

    if json {
        let rendered = serde_json::to_string_pretty(&response)?;
        println!("{rendered}");
    } else {
        render_text(&response);
    }

    Ok(())
}

fn load_catalog(path: PathBuf) -> Result<WasteCatalog, AppError> {
    let file = std::fs::File::open(path)?;
    serde_json::from_reader(file).map_err(|err| AppError::Import(err.into()))
}

fn render_text(response: &InsightResponse) {
    println!("Waste collection insights for {}", response.generated_for);
    render_summary(&response.summary);

    let months = response
        .monthly_totals
        .buckets()
        .iter()
        .map(|bucket| format!("{}-{:02}: {:.2} kg", bucket.year, bucket.month, bucket.total_weight))
        .collect::<Vec<_>>()
        .join(" | ");
    println!("Monthly totals: {months}");

    println!("\nInsights");
    for (idx, insight) in response.insights.iter().enumerate() {
        render_insight(idx + 1, insight);
    }

    if !response.leaderboard.is_empty() {
        println!("\nLeaderboard earnings");
        for entry in &response.leaderboard {
            println!(
                "  - {} ({}): {}",
                entry.contributor.display_name,
                entry.contributor.id,
                MetricValue::Currency(entry.total_earnings)
            );
        }
    }
}

fn render_summary(summary: &CollectionSummary) {
    println!(
        "{} records | {:.2} kg collected | {} locations | recycling rate {} | earnings {}",
        summary.record_count,
        summary.total_weight,
        summary.unique_locations,
        MetricValue::Percentage(summary.recycling_rate_pct),
        MetricValue::Currency(summary.total_earnings)
    );
}

fn render_insight(position: usize, insight: &Insight) {
    println!(
        "{position}. [{}] {}: {}",
        insight.severity.label(),
        insight.kind.label(),
        insight.text
    );
    for metric in &insight.metrics {
        println!("     {}: {}", metric.name, metric.display());
    }
}
