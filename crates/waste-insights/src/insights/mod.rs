mod aggregate;
mod config;
mod contributors;
pub mod domain;
mod report;
pub mod rules;

pub use aggregate::{monthly_totals, MonthlyBucket, MonthlyTotals};
pub use config::{
    CompositionThresholds, DistributionThresholds, InsightConfig, InsightConfigError,
    InsightThresholds, ScoreUnit, SeasonalThresholds, TrendThresholds, DEFAULT_TARGET_CATEGORY,
    DEFAULT_WINDOW_MONTHS, MAX_WINDOW_MONTHS,
};
pub use contributors::{top_contributor, TopContributor};
pub use domain::{CollectionRecord, Contributor, Insight, InsightKind, Metric, MetricValue, Severity};
pub use report::{InsightDetail, InsightReport, Recommendation, TopContributorInsight};

use chrono::NaiveDate;

/// Stateless engine that applies an [`InsightConfig`] to a snapshot of
/// collection records and the contributor leaderboard.
///
/// Every call recomputes the full report from its inputs; nothing is cached
/// between calls, so one engine can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightConfig,
}

impl InsightEngine {
    pub fn new(config: InsightConfig) -> Result<Self, InsightConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Builds the report with `now` as the reference month.
    pub fn generate(
        &self,
        records: &[CollectionRecord],
        contributors: &[Contributor],
        now: NaiveDate,
    ) -> InsightReport {
        report::generate_insights(records, contributors, now, &self.config)
    }
}
