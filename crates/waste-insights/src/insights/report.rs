use super::aggregate::{monthly_totals, MonthlyTotals};
use super::config::{InsightConfig, ScoreUnit};
use super::contributors::{top_contributor, TopContributor};
use super::domain::{CollectionRecord, Contributor, Insight, InsightKind, Metric, MetricValue, Severity};
use super::rules::{
    classify_composition, classify_distribution, classify_seasonal, classify_trend,
    CompositionClassification, CompositionLabel, DistributionClassification, DistributionLabel,
    SeasonalClassification, SeasonalLabel, TrendClassification, TrendLabel,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the dashboard should push collection effort next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopContributorInsight {
    pub result: TopContributor,
    pub unit: ScoreUnit,
}

/// One typed entry per insight kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightDetail {
    Trend(TrendClassification),
    Seasonal(SeasonalClassification),
    Composition(CompositionClassification),
    Distribution(DistributionClassification),
    Recommendation(Recommendation),
    TopContributor(TopContributorInsight),
}

impl InsightDetail {
    pub const fn kind(&self) -> InsightKind {
        match self {
            InsightDetail::Trend(_) => InsightKind::Trend,
            InsightDetail::Seasonal(_) => InsightKind::Seasonal,
            InsightDetail::Composition(_) => InsightKind::Composition,
            InsightDetail::Distribution(_) => InsightKind::Distribution,
            InsightDetail::Recommendation(_) => InsightKind::Recommendation,
            InsightDetail::TopContributor(_) => InsightKind::TopContributor,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            InsightDetail::Trend(trend) => match trend.label {
                TrendLabel::SignificantIncrease => Severity::Critical,
                TrendLabel::Stable => Severity::Warning,
                TrendLabel::ModerateIncrease
                | TrendLabel::ModerateDecrease
                | TrendLabel::SignificantDecrease => Severity::Positive,
                TrendLabel::InsufficientData => Severity::Info,
            },
            InsightDetail::Seasonal(seasonal) => match seasonal.label {
                SeasonalLabel::SignificantSeasonalIncrease => Severity::Critical,
                SeasonalLabel::StableSeasonalPattern => Severity::Warning,
                SeasonalLabel::ModerateSeasonalIncrease => Severity::Positive,
                SeasonalLabel::InsufficientData => Severity::Info,
            },
            InsightDetail::Composition(composition) => match composition.label {
                CompositionLabel::High => Severity::Positive,
                CompositionLabel::Medium => Severity::Warning,
                CompositionLabel::Low => Severity::Critical,
                CompositionLabel::InsufficientData => Severity::Info,
            },
            InsightDetail::Distribution(distribution) => match distribution.label {
                DistributionLabel::EvenlyDistributed => Severity::Positive,
                DistributionLabel::SomewhatUneven => Severity::Warning,
                DistributionLabel::HighlyUneven => Severity::Critical,
                DistributionLabel::InsufficientData => Severity::Info,
            },
            InsightDetail::Recommendation(_) => Severity::Info,
            InsightDetail::TopContributor(_) => Severity::Highlight,
        }
    }

    pub fn text(&self) -> String {
        match self {
            InsightDetail::Trend(trend) => {
                format!("Predicted waste trend: {}", trend.label.label())
            }
            InsightDetail::Seasonal(seasonal) => {
                format!("Seasonal waste pattern: {}", seasonal.label.label())
            }
            InsightDetail::Composition(composition) => format!(
                "{} recycling level falls in the {} category",
                composition.category,
                composition.label.label()
            ),
            InsightDetail::Distribution(distribution) => format!(
                "Collected volume across locations is {}",
                distribution.label.label()
            ),
            InsightDetail::Recommendation(recommendation) => format!(
                "Recommendation: increase collection effort in {}",
                recommendation.focus_location.as_deref().unwrap_or("-")
            ),
            InsightDetail::TopContributor(top) => match top.result.contributor() {
                Some(contributor) => format!(
                    "{} is the top collector with {}",
                    contributor.display_name,
                    format_score(contributor.score, top.unit)
                ),
                None => "No contributor recorded yet".to_string(),
            },
        }
    }

    pub fn metrics(&self) -> Vec<Metric> {
        match self {
            InsightDetail::Trend(trend) => trend.metrics(),
            InsightDetail::Seasonal(seasonal) => seasonal.metrics(),
            InsightDetail::Composition(composition) => composition.metrics(),
            InsightDetail::Distribution(distribution) => distribution.metrics(),
            InsightDetail::Recommendation(recommendation) => recommendation
                .focus_weight
                .map(|weight| vec![Metric::new("Location Volume (kg)", MetricValue::Number(weight))])
                .unwrap_or_default(),
            InsightDetail::TopContributor(top) => top
                .result
                .contributor()
                .map(|contributor| vec![Metric::new("Score", score_value(contributor.score, top.unit))])
                .unwrap_or_default(),
        }
    }

    pub fn render(&self) -> Insight {
        Insight {
            kind: self.kind(),
            text: self.text(),
            metrics: self.metrics(),
            severity: self.severity(),
        }
    }
}

fn score_value(score: f64, unit: ScoreUnit) -> MetricValue {
    match unit {
        ScoreUnit::Points => MetricValue::Number(score),
        ScoreUnit::Rupiah => MetricValue::Currency(score),
    }
}

fn format_score(score: f64, unit: ScoreUnit) -> String {
    match unit {
        ScoreUnit::Points if score.fract() == 0.0 => format!("{score:.0} points"),
        ScoreUnit::Points => format!("{score:.2} points"),
        ScoreUnit::Rupiah => MetricValue::Currency(score).to_string(),
    }
}

/// Complete engine output. Each slot is always present, so positional
/// consumers can rely on [`InsightReport::insights`] returning six entries in
/// a fixed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub monthly_totals: MonthlyTotals,
    pub trend: TrendClassification,
    pub seasonal: SeasonalClassification,
    pub composition: CompositionClassification,
    pub distribution: DistributionClassification,
    pub recommendation: Recommendation,
    pub top_contributor: TopContributorInsight,
}

impl InsightReport {
    pub fn details(&self) -> [InsightDetail; 6] {
        [
            InsightDetail::Trend(self.trend.clone()),
            InsightDetail::Seasonal(self.seasonal.clone()),
            InsightDetail::Composition(self.composition.clone()),
            InsightDetail::Distribution(self.distribution.clone()),
            InsightDetail::Recommendation(self.recommendation.clone()),
            InsightDetail::TopContributor(self.top_contributor.clone()),
        ]
    }

    pub fn insights(&self) -> [Insight; 6] {
        self.details().map(|detail| detail.render())
    }
}

pub(crate) fn generate_insights(
    records: &[CollectionRecord],
    contributors: &[Contributor],
    now: NaiveDate,
    config: &InsightConfig,
) -> InsightReport {
    let thresholds = &config.thresholds;
    let monthly_totals = monthly_totals(records, config.window_months, now);

    let trend = classify_trend(
        monthly_totals.previous(),
        monthly_totals.current(),
        &thresholds.trend,
    );
    let seasonal = classify_seasonal(&monthly_totals, &thresholds.seasonal);
    let composition =
        classify_composition(records, &config.target_category, &thresholds.composition);
    let distribution = classify_distribution(records, &thresholds.distribution);

    let recommendation = Recommendation {
        focus_location: distribution
            .heaviest
            .as_ref()
            .map(|entry| entry.location.clone()),
        focus_weight: distribution.heaviest.as_ref().map(|entry| entry.total_weight),
    };

    let top_contributor = TopContributorInsight {
        result: top_contributor(contributors),
        unit: config.score_unit,
    };

    debug!(
        records = records.len(),
        contributors = contributors.len(),
        %now,
        trend = trend.label.label(),
        seasonal = seasonal.label.label(),
        composition = composition.label.label(),
        distribution = distribution.label.label(),
        "insights generated"
    );

    InsightReport {
        monthly_totals,
        trend,
        seasonal,
        composition,
        distribution,
        recommendation,
        top_contributor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date")
    }

    #[test]
    fn empty_inputs_still_fill_every_slot() {
        let report = generate_insights(&[], &[], now(), &InsightConfig::default());
        let insights = report.insights();

        let kinds: Vec<InsightKind> = insights.iter().map(|insight| insight.kind).collect();
        assert_eq!(kinds, InsightKind::ordered().to_vec());
        assert_eq!(report.trend.label, TrendLabel::InsufficientData);
        assert_eq!(report.seasonal.label, SeasonalLabel::InsufficientData);
        assert_eq!(report.composition.label, CompositionLabel::InsufficientData);
        assert_eq!(report.distribution.label, DistributionLabel::InsufficientData);
        assert_eq!(insights[4].text, "Recommendation: increase collection effort in -");
        assert_eq!(insights[5].text, "No contributor recorded yet");
        assert!(insights[..4]
            .iter()
            .all(|insight| insight.severity == Severity::Info));
    }

    #[test]
    fn rupiah_scores_render_as_currency() {
        let config = InsightConfig {
            score_unit: ScoreUnit::Rupiah,
            ..InsightConfig::default()
        };
        let contributors = vec![Contributor::new("u-9", "Wati", 125_000.0)];

        let report = generate_insights(&[], &contributors, now(), &config);
        let top = report.insights()[5].clone();

        assert_eq!(top.text, "Wati is the top collector with Rp 125.000");
        assert_eq!(top.severity, Severity::Highlight);
        assert_eq!(top.metrics[0].value, MetricValue::Currency(125_000.0));
    }

    #[test]
    fn severity_follows_label_mapping() {
        let detail = InsightDetail::Composition(CompositionClassification {
            label: CompositionLabel::Low,
            category: "Plastik".to_string(),
            matching_records: 0,
            total_records: 4,
            share_pct: Some(0.0),
        });
        assert_eq!(detail.severity(), Severity::Critical);
        assert_eq!(detail.text(), "Plastik recycling level falls in the Low category");
    }
}
