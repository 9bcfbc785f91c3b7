//! Threshold rules turning aggregated numbers into qualitative labels.
//!
//! Every classifier is total: zero denominators and empty inputs map to an
//! `InsufficientData` label instead of an error.

use super::aggregate::MonthlyTotals;
use super::config::{
    CompositionThresholds, DistributionThresholds, SeasonalThresholds, TrendThresholds,
};
use super::domain::{coerce_non_negative, CollectionRecord, Metric, MetricValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(crate) const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    SignificantIncrease,
    ModerateIncrease,
    SignificantDecrease,
    ModerateDecrease,
    Stable,
    InsufficientData,
}

impl TrendLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SignificantIncrease => "Significant Increase",
            Self::ModerateIncrease => "Moderate Increase",
            Self::SignificantDecrease => "Significant Decrease",
            Self::ModerateDecrease => "Moderate Decrease",
            Self::Stable => "Stable",
            Self::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendClassification {
    pub label: TrendLabel,
    pub previous: f64,
    pub current: f64,
    /// `None` when the previous month is empty.
    pub ratio: Option<f64>,
}

impl TrendClassification {
    pub fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new("Last Month (kg)", MetricValue::Number(self.previous)),
            Metric::new("This Month (kg)", MetricValue::Number(self.current)),
            Metric::new(
                "Ratio",
                self.ratio.map_or_else(
                    || MetricValue::Label(NOT_AVAILABLE.to_string()),
                    MetricValue::Number,
                ),
            ),
        ]
    }
}

/// Month-over-month change. Bounds are checked in order and the first match wins.
pub fn classify_trend(
    previous: f64,
    current: f64,
    thresholds: &TrendThresholds,
) -> TrendClassification {
    let previous = coerce_non_negative(previous);
    let current = coerce_non_negative(current);

    if previous == 0.0 {
        return TrendClassification {
            label: TrendLabel::InsufficientData,
            previous,
            current,
            ratio: None,
        };
    }

    let ratio = current / previous;
    let label = if ratio >= thresholds.significant_increase {
        TrendLabel::SignificantIncrease
    } else if ratio >= thresholds.moderate_increase {
        TrendLabel::ModerateIncrease
    } else if ratio <= thresholds.significant_decrease {
        TrendLabel::SignificantDecrease
    } else if ratio <= thresholds.moderate_decrease {
        TrendLabel::ModerateDecrease
    } else {
        TrendLabel::Stable
    };

    TrendClassification {
        label,
        previous,
        current,
        ratio: Some(ratio),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonalLabel {
    SignificantSeasonalIncrease,
    ModerateSeasonalIncrease,
    StableSeasonalPattern,
    InsufficientData,
}

impl SeasonalLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SignificantSeasonalIncrease => "Significant Seasonal Increase",
            Self::ModerateSeasonalIncrease => "Moderate Seasonal Increase",
            Self::StableSeasonalPattern => "Stable Seasonal Pattern",
            Self::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalClassification {
    pub label: SeasonalLabel,
    pub monthly_weights: Vec<f64>,
    pub average_past: Option<f64>,
    pub change_pct: Option<f64>,
}

impl SeasonalClassification {
    pub fn metrics(&self) -> Vec<Metric> {
        let series = self
            .monthly_weights
            .iter()
            .map(|weight| format!("{weight:.2}"))
            .collect::<Vec<_>>()
            .join(", ");

        vec![
            Metric::new("Monthly Data (kg)", MetricValue::Label(series)),
            Metric::new(
                "Past Average (kg)",
                self.average_past.map_or_else(
                    || MetricValue::Label(NOT_AVAILABLE.to_string()),
                    MetricValue::Number,
                ),
            ),
            Metric::new(
                "Change",
                self.change_pct.map_or_else(
                    || MetricValue::Label(NOT_AVAILABLE.to_string()),
                    MetricValue::Percentage,
                ),
            ),
        ]
    }
}

/// Compares the latest month with the mean of the earlier months in the
/// window. Decreases of any size fall into the stable band.
pub fn classify_seasonal(
    totals: &MonthlyTotals,
    thresholds: &SeasonalThresholds,
) -> SeasonalClassification {
    let monthly_weights: Vec<f64> = totals
        .weights()
        .into_iter()
        .map(coerce_non_negative)
        .collect();

    let Some((latest, past)) = monthly_weights.split_last() else {
        return insufficient_seasonal(monthly_weights);
    };
    if past.is_empty() {
        return insufficient_seasonal(monthly_weights);
    }

    let average_past = past.iter().sum::<f64>() / past.len() as f64;
    if average_past == 0.0 {
        return insufficient_seasonal(monthly_weights);
    }

    let change_pct = (latest - average_past) * 100.0 / average_past;
    let label = if change_pct > thresholds.significant_pct {
        SeasonalLabel::SignificantSeasonalIncrease
    } else if change_pct > thresholds.moderate_pct {
        SeasonalLabel::ModerateSeasonalIncrease
    } else {
        SeasonalLabel::StableSeasonalPattern
    };

    SeasonalClassification {
        label,
        monthly_weights,
        average_past: Some(average_past),
        change_pct: Some(change_pct),
    }
}

fn insufficient_seasonal(monthly_weights: Vec<f64>) -> SeasonalClassification {
    SeasonalClassification {
        label: SeasonalLabel::InsufficientData,
        monthly_weights,
        average_past: None,
        change_pct: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionLabel {
    Low,
    Medium,
    High,
    InsufficientData,
}

impl CompositionLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionClassification {
    pub label: CompositionLabel,
    pub category: String,
    pub matching_records: usize,
    pub total_records: usize,
    pub share_pct: Option<f64>,
}

impl CompositionClassification {
    pub fn metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new(
                format!("{} Share (%)", self.category),
                self.share_pct.map_or_else(
                    || MetricValue::Label(NOT_AVAILABLE.to_string()),
                    MetricValue::Percentage,
                ),
            ),
            Metric::new(
                "Matching Records",
                MetricValue::Number(self.matching_records as f64),
            ),
            Metric::new("Total Records", MetricValue::Number(self.total_records as f64)),
        ]
    }
}

/// Share of *records* (not of weight) whose category equals `category`
/// exactly.
pub fn classify_composition(
    records: &[CollectionRecord],
    category: &str,
    thresholds: &CompositionThresholds,
) -> CompositionClassification {
    let total_records = records.len();
    let matching_records = records
        .iter()
        .filter(|record| record.waste_category == category)
        .count();

    if total_records == 0 {
        return CompositionClassification {
            label: CompositionLabel::InsufficientData,
            category: category.to_string(),
            matching_records,
            total_records,
            share_pct: None,
        };
    }

    let share_pct = matching_records as f64 * 100.0 / total_records as f64;
    let label = if share_pct <= thresholds.low_max_pct {
        CompositionLabel::Low
    } else if share_pct <= thresholds.medium_max_pct {
        CompositionLabel::Medium
    } else {
        CompositionLabel::High
    };

    CompositionClassification {
        label,
        category: category.to_string(),
        matching_records,
        total_records,
        share_pct: Some(share_pct),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionLabel {
    EvenlyDistributed,
    SomewhatUneven,
    HighlyUneven,
    InsufficientData,
}

impl DistributionLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::EvenlyDistributed => "Evenly Distributed",
            Self::SomewhatUneven => "Somewhat Uneven",
            Self::HighlyUneven => "Highly Uneven",
            Self::InsufficientData => "Insufficient Data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationVolume {
    pub location: String,
    pub total_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionClassification {
    pub label: DistributionLabel,
    /// Per-location totals in first-seen order.
    pub volumes: Vec<LocationVolume>,
    pub total_weight: f64,
    pub heaviest: Option<LocationVolume>,
    pub max_share: Option<f64>,
}

impl DistributionClassification {
    pub fn metrics(&self) -> Vec<Metric> {
        let volumes = if self.volumes.is_empty() {
            "-".to_string()
        } else {
            self.volumes
                .iter()
                .map(|entry| format!("{}: {:.2} kg", entry.location, entry.total_weight))
                .collect::<Vec<_>>()
                .join(", ")
        };

        vec![
            Metric::new("Location Volume", MetricValue::Label(volumes)),
            Metric::new(
                "Largest Share",
                self.max_share.map_or_else(
                    || MetricValue::Label(NOT_AVAILABLE.to_string()),
                    |share| MetricValue::Percentage(share * 100.0),
                ),
            ),
        ]
    }
}

/// Measures how much of the collected weight comes from the single heaviest
/// location. The first location reaching the maximum wins ties.
pub fn classify_distribution(
    records: &[CollectionRecord],
    thresholds: &DistributionThresholds,
) -> DistributionClassification {
    let volumes = location_volumes(records);
    let total_weight: f64 = volumes.iter().map(|entry| entry.total_weight).sum();

    let heaviest = volumes.iter().fold(None::<&LocationVolume>, |best, entry| {
        match best {
            Some(current) if current.total_weight >= entry.total_weight => Some(current),
            _ => Some(entry),
        }
    });
    let heaviest = heaviest.cloned();

    let Some(max_entry) = heaviest.as_ref().filter(|_| total_weight > 0.0) else {
        return DistributionClassification {
            label: DistributionLabel::InsufficientData,
            volumes,
            total_weight,
            heaviest: None,
            max_share: None,
        };
    };

    let max_share = max_entry.total_weight / total_weight;
    let label = if max_share <= thresholds.even_max_ratio {
        DistributionLabel::EvenlyDistributed
    } else if max_share <= thresholds.somewhat_uneven_max_ratio {
        DistributionLabel::SomewhatUneven
    } else {
        DistributionLabel::HighlyUneven
    };

    DistributionClassification {
        label,
        volumes,
        total_weight,
        heaviest,
        max_share: Some(max_share),
    }
}

fn location_volumes(records: &[CollectionRecord]) -> Vec<LocationVolume> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut volumes: Vec<LocationVolume> = Vec::new();

    for record in records {
        let weight = record.effective_weight();
        match positions.get(record.location_tag.as_str()) {
            Some(&idx) => volumes[idx].total_weight += weight,
            None => {
                positions.insert(record.location_tag.as_str(), volumes.len());
                volumes.push(LocationVolume {
                    location: record.location_tag.clone(),
                    total_weight: weight,
                });
            }
        }
    }

    volumes
}
