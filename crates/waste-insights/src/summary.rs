//! Headline figures shown above the insight cards on the admin dashboard.

use crate::insights::domain::coerce_non_negative;
use crate::insights::{CollectionRecord, Contributor};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Categories treated as recyclable when no catalog has been loaded.
pub const COMMON_RECYCLABLES: [&str; 6] = ["Plastik", "Kertas", "Kaca", "Logam", "Kardus", "Aluminium"];

/// Price and recyclability of one waste category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WasteType {
    pub name: String,
    #[serde(alias = "pricePerKg")]
    pub price_per_kg: f64,
    #[serde(default)]
    pub recyclable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WasteCatalog {
    types: Vec<WasteType>,
}

impl WasteCatalog {
    pub fn new(types: Vec<WasteType>) -> Self {
        Self { types }
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn find(&self, category: &str) -> Option<&WasteType> {
        self.types.iter().find(|entry| entry.name == category)
    }

    /// Rupiah value of a record; categories missing from the catalog earn nothing.
    pub fn value_of(&self, record: &CollectionRecord) -> f64 {
        self.find(&record.waste_category)
            .map(|entry| record.effective_weight() * coerce_non_negative(entry.price_per_kg))
            .unwrap_or(0.0)
    }

    pub fn is_recyclable(&self, category: &str) -> bool {
        if self.types.is_empty() {
            COMMON_RECYCLABLES.contains(&category)
        } else {
            self.find(category).is_some_and(|entry| entry.recyclable)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub total_weight: f64,
    pub total_earnings: f64,
    pub unique_locations: usize,
    pub recyclable_weight: f64,
    /// Recyclable weight as a percentage of all weight; zero when nothing was collected.
    pub recycling_rate_pct: f64,
    pub record_count: usize,
}

impl CollectionSummary {
    pub fn compute(records: &[CollectionRecord], catalog: &WasteCatalog) -> Self {
        let total_weight: f64 = records.iter().map(CollectionRecord::effective_weight).sum();
        let total_earnings: f64 = records.iter().map(|record| catalog.value_of(record)).sum();
        let unique_locations = records
            .iter()
            .map(|record| record.location_tag.as_str())
            .collect::<HashSet<_>>()
            .len();
        let recyclable_weight: f64 = records
            .iter()
            .filter(|record| catalog.is_recyclable(&record.waste_category))
            .map(CollectionRecord::effective_weight)
            .sum();
        let recycling_rate_pct = if total_weight > 0.0 {
            recyclable_weight * 100.0 / total_weight
        } else {
            0.0
        };

        Self {
            total_weight,
            total_earnings,
            unique_locations,
            recyclable_weight,
            recycling_rate_pct,
            record_count: records.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorEarnings {
    pub contributor: Contributor,
    pub total_earnings: f64,
}

/// Pairs every leaderboard entry with the rupiah value of the records it
/// submitted, keeping leaderboard order.
pub fn contributor_earnings(
    contributors: &[Contributor],
    records: &[CollectionRecord],
    catalog: &WasteCatalog,
) -> Vec<ContributorEarnings> {
    let mut earnings: HashMap<&str, f64> = HashMap::new();
    for record in records {
        if let Some(contributor_id) = record.contributor_id.as_deref() {
            *earnings.entry(contributor_id).or_default() += catalog.value_of(record);
        }
    }

    contributors
        .iter()
        .map(|contributor| ContributorEarnings {
            contributor: contributor.clone(),
            total_earnings: earnings.get(contributor.id.as_str()).copied().unwrap_or(0.0),
        })
        .collect()
}
