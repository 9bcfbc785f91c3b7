use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Clamps any numeric input to a non-negative finite value. Everything else
/// becomes zero so downstream arithmetic never sees `NaN` or infinities.
pub fn coerce_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// A single batch of collected waste as logged by the collection-entry form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    #[serde(alias = "berat", default, deserialize_with = "lenient_amount")]
    pub weight: f64,
    #[serde(alias = "jenisSampah", alias = "wasteCategory", default)]
    pub waste_category: String,
    #[serde(
        alias = "waktu",
        alias = "collectedAt",
        default,
        deserialize_with = "lenient_timestamp"
    )]
    pub collected_at: Option<NaiveDateTime>,
    #[serde(alias = "rt", alias = "locationTag", default)]
    pub location_tag: String,
    #[serde(
        alias = "userId",
        alias = "contributorId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contributor_id: Option<String>,
}

impl CollectionRecord {
    pub fn new(
        weight: f64,
        waste_category: impl Into<String>,
        collected_at: Option<NaiveDateTime>,
        location_tag: impl Into<String>,
    ) -> Self {
        Self {
            weight: coerce_non_negative(weight),
            waste_category: waste_category.into(),
            collected_at,
            location_tag: location_tag.into(),
            contributor_id: None,
        }
    }

    pub fn with_contributor(mut self, contributor_id: impl Into<String>) -> Self {
        self.contributor_id = Some(contributor_id.into());
        self
    }

    /// Weight as seen by the classifiers, re-coerced in case the record was
    /// built by hand with a bad value.
    pub fn effective_weight(&self) -> f64 {
        coerce_non_negative(self.weight)
    }
}

/// A ranked leaderboard entry. The score is points or rupiah depending on the
/// configured [`ScoreUnit`](super::ScoreUnit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(alias = "userId")]
    pub id: String,
    #[serde(alias = "displayName", alias = "username")]
    pub display_name: String,
    #[serde(alias = "totalPoin", default, deserialize_with = "lenient_amount")]
    pub score: f64,
}

impl Contributor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            score: coerce_non_negative(score),
        }
    }

    pub fn effective_score(&self) -> f64 {
        coerce_non_negative(self.score)
    }
}

/// Display value attached to an insight metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Number(f64),
    Percentage(f64),
    Currency(f64),
    Label(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(value) => write!(f, "{value:.2}"),
            MetricValue::Percentage(value) => write!(f, "{value:.2}%"),
            MetricValue::Currency(value) => write!(f, "Rp {}", group_thousands(*value)),
            MetricValue::Label(value) => f.write_str(value),
        }
    }
}

fn group_thousands(value: f64) -> String {
    let rounded = coerce_non_negative(value).round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: MetricValue,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: MetricValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn display(&self) -> String {
        self.value.to_string()
    }
}

/// Visual emphasis tier used by the dashboard renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Positive,
    Info,
    Highlight,
}

impl Severity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Warning => "Warning",
            Self::Positive => "Positive",
            Self::Info => "Info",
            Self::Highlight => "Highlight",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    Seasonal,
    Composition,
    Distribution,
    Recommendation,
    TopContributor,
}

impl InsightKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::Trend,
            Self::Seasonal,
            Self::Composition,
            Self::Distribution,
            Self::Recommendation,
            Self::TopContributor,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Trend => "Month-over-Month Trend",
            Self::Seasonal => "Seasonal Pattern",
            Self::Composition => "Category Share",
            Self::Distribution => "Location Distribution",
            Self::Recommendation => "Recommendation",
            Self::TopContributor => "Top Contributor",
        }
    }
}

/// Rendered insight: plain data, ready for the dashboard or a JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<Metric>,
    pub severity: Severity,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().map(amount_from_value).unwrap_or(0.0))
}

fn amount_from_value(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(number) => number.as_f64().map(coerce_non_negative).unwrap_or(0.0),
        serde_json::Value::String(text) => parse_amount(text),
        _ => 0.0,
    }
}

/// Parses a weight or score as typed into a form; anything unparseable is zero.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map(coerce_non_negative)
        .unwrap_or(0.0)
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => parse_timestamp(&text),
        _ => None,
    })
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Accepts RFC 3339, Postgres text timestamps (fractional seconds, `+00`
/// offsets), `datetime-local` values without seconds and bare dates. Offsets
/// are dropped in favor of the wall-clock time they were recorded with.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt.naive_local());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0));
    if parsed.is_none() {
        tracing::debug!(value = trimmed, "discarding unparseable collection timestamp");
    }
    parsed
}
