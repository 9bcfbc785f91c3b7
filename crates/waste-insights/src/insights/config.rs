use serde::{Deserialize, Serialize};

pub const DEFAULT_WINDOW_MONTHS: usize = 6;
/// Ten years of monthly buckets.
pub const MAX_WINDOW_MONTHS: usize = 120;
pub const DEFAULT_TARGET_CATEGORY: &str = "Plastik";

/// Engine configuration. Passed in explicitly so the engine never reads the
/// environment on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightConfig {
    pub window_months: usize,
    pub target_category: String,
    pub score_unit: ScoreUnit,
    pub thresholds: InsightThresholds,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            window_months: DEFAULT_WINDOW_MONTHS,
            target_category: DEFAULT_TARGET_CATEGORY.to_string(),
            score_unit: ScoreUnit::Points,
            thresholds: InsightThresholds::default(),
        }
    }
}

impl InsightConfig {
    pub fn validate(&self) -> Result<(), InsightConfigError> {
        if self.window_months < 2 {
            return Err(InsightConfigError::WindowTooShort(self.window_months));
        }

        if self.window_months > MAX_WINDOW_MONTHS {
            return Err(InsightConfigError::WindowTooLong(self.window_months));
        }

        if self.target_category.trim().is_empty() {
            return Err(InsightConfigError::EmptyTargetCategory);
        }

        self.thresholds.validate()
    }
}

/// How contributor scores are expressed on the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreUnit {
    Points,
    Rupiah,
}

impl ScoreUnit {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "points" | "poin" => Some(Self::Points),
            "rupiah" | "idr" => Some(Self::Rupiah),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightThresholds {
    pub trend: TrendThresholds,
    pub seasonal: SeasonalThresholds,
    pub composition: CompositionThresholds,
    pub distribution: DistributionThresholds,
}

impl InsightThresholds {
    fn validate(&self) -> Result<(), InsightConfigError> {
        let trend = &self.trend;
        ordered(
            "trend",
            &[
                trend.significant_decrease,
                trend.moderate_decrease,
                trend.moderate_increase,
                trend.significant_increase,
            ],
        )?;
        ordered(
            "seasonal",
            &[self.seasonal.moderate_pct, self.seasonal.significant_pct],
        )?;
        ordered(
            "composition",
            &[self.composition.low_max_pct, self.composition.medium_max_pct],
        )?;
        ordered(
            "distribution",
            &[
                self.distribution.even_max_ratio,
                self.distribution.somewhat_uneven_max_ratio,
            ],
        )
    }
}

fn ordered(group: &'static str, bounds: &[f64]) -> Result<(), InsightConfigError> {
    let well_formed = bounds.iter().all(|bound| bound.is_finite() && *bound >= 0.0)
        && bounds.windows(2).all(|pair| pair[0] < pair[1]);
    if well_formed {
        Ok(())
    } else {
        Err(InsightConfigError::UnorderedThresholds(group))
    }
}

/// Month-over-month ratio bounds (current / previous).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendThresholds {
    pub significant_increase: f64,
    pub moderate_increase: f64,
    pub significant_decrease: f64,
    pub moderate_decrease: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            significant_increase: 1.20,
            moderate_increase: 1.05,
            significant_decrease: 0.80,
            moderate_decrease: 0.95,
        }
    }
}

/// Percent change of the latest month against the trailing average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalThresholds {
    pub significant_pct: f64,
    pub moderate_pct: f64,
}

impl Default for SeasonalThresholds {
    fn default() -> Self {
        Self {
            significant_pct: 20.0,
            moderate_pct: 10.0,
        }
    }
}

/// Upper bounds (inclusive) for the low and medium share bands, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionThresholds {
    pub low_max_pct: f64,
    pub medium_max_pct: f64,
}

impl Default for CompositionThresholds {
    fn default() -> Self {
        Self {
            low_max_pct: 5.0,
            medium_max_pct: 25.0,
        }
    }
}

/// Upper bounds (inclusive) on the heaviest location's share of total volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionThresholds {
    pub even_max_ratio: f64,
    pub somewhat_uneven_max_ratio: f64,
}

impl Default for DistributionThresholds {
    fn default() -> Self {
        Self {
            even_max_ratio: 0.30,
            somewhat_uneven_max_ratio: 0.50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InsightConfigError {
    #[error("insight window must cover at least 2 months (got {0})")]
    WindowTooShort(usize),
    #[error("insight window must not exceed {max} months (got {0})", max = MAX_WINDOW_MONTHS)]
    WindowTooLong(usize),
    #[error("target waste category must not be empty")]
    EmptyTargetCategory,
    #[error("{0} thresholds must be finite, non-negative and strictly increasing")]
    UnorderedThresholds(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(InsightConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_single_month_window() {
        let config = InsightConfig {
            window_months: 1,
            ..InsightConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(InsightConfigError::WindowTooShort(1))
        );
    }

    #[test]
    fn window_is_capped_at_ten_years() {
        let longest = InsightConfig {
            window_months: MAX_WINDOW_MONTHS,
            ..InsightConfig::default()
        };
        assert!(longest.validate().is_ok());

        let config = InsightConfig {
            window_months: 100_000_000_000,
            ..InsightConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(InsightConfigError::WindowTooLong(100_000_000_000))
        );
    }

    #[test]
    fn rejects_overlapping_trend_bounds() {
        let mut config = InsightConfig::default();
        config.thresholds.trend.moderate_decrease = 1.10;
        assert_eq!(
            config.validate(),
            Err(InsightConfigError::UnorderedThresholds("trend"))
        );
    }

    #[test]
    fn score_unit_accepts_local_names() {
        assert_eq!(ScoreUnit::parse("Poin"), Some(ScoreUnit::Points));
        assert_eq!(ScoreUnit::parse("rupiah"), Some(ScoreUnit::Rupiah));
        assert_eq!(ScoreUnit::parse("stars"), None);
    }
}
