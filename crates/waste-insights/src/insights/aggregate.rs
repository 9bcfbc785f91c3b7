use super::domain::CollectionRecord;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Total weight collected in one calendar month of the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// 0 is the reference month, 1 the month before, and so on.
    pub month_offset: u32,
    pub year: i32,
    pub month: u32,
    pub total_weight: f64,
}

/// Trailing monthly totals, oldest first. Always holds exactly the requested
/// number of buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    buckets: Vec<MonthlyBucket>,
}

impl MonthlyTotals {
    pub fn buckets(&self) -> &[MonthlyBucket] {
        &self.buckets
    }

    pub fn weights(&self) -> Vec<f64> {
        self.buckets.iter().map(|bucket| bucket.total_weight).collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Reference month total, or zero for an empty window.
    pub fn current(&self) -> f64 {
        self.buckets
            .last()
            .map(|bucket| bucket.total_weight)
            .unwrap_or(0.0)
    }

    /// Total for the month before the reference month, or zero.
    pub fn previous(&self) -> f64 {
        self.buckets
            .len()
            .checked_sub(2)
            .and_then(|idx| self.buckets.get(idx))
            .map(|bucket| bucket.total_weight)
            .unwrap_or(0.0)
    }
}

/// Sums record weights into `window` calendar-month buckets ending at the
/// month containing `now`. Undated records and records outside the window are
/// skipped.
pub fn monthly_totals(records: &[CollectionRecord], window: usize, now: NaiveDate) -> MonthlyTotals {
    let reference = month_index(now.year(), now.month());
    let mut totals = vec![0.0_f64; window];

    for record in records {
        let Some(collected_at) = record.collected_at else {
            continue;
        };
        let offset = reference - month_index(collected_at.year(), collected_at.month());
        let Ok(offset) = usize::try_from(offset) else {
            continue;
        };
        if offset < window {
            totals[window - 1 - offset] += record.effective_weight();
        }
    }

    let buckets = totals
        .into_iter()
        .enumerate()
        .map(|(position, total_weight)| {
            let month_offset = (window - 1 - position) as u32;
            let (year, month) = from_month_index(reference - i64::from(month_offset));
            MonthlyBucket {
                month_offset,
                year,
                month,
                total_weight,
            }
        })
        .collect();

    MonthlyTotals { buckets }
}

fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

fn from_month_index(index: i64) -> (i32, u32) {
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;
    (year, month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(year: i32, month: u32, day: u32, weight: f64) -> CollectionRecord {
        let collected_at = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid timestamp");
        CollectionRecord::new(weight, "Organik", Some(collected_at), "RT 01")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 15).expect("valid date")
    }

    #[test]
    fn empty_input_still_yields_full_window_of_zeros() {
        let totals = monthly_totals(&[], 6, today());
        assert_eq!(totals.len(), 6);
        assert!(totals.weights().iter().all(|weight| *weight == 0.0));
    }

    #[test]
    fn buckets_by_calendar_month_across_year_boundary() {
        let records = vec![
            on(2025, 2, 1, 10.0),
            on(2025, 2, 28, 5.0),
            on(2025, 1, 31, 7.0),
            on(2024, 12, 1, 3.0),
            on(2024, 9, 30, 2.0),
            on(2024, 8, 31, 100.0),
        ];

        let totals = monthly_totals(&records, 6, today());

        assert_eq!(totals.weights(), vec![2.0, 0.0, 0.0, 3.0, 7.0, 15.0]);
        let oldest = &totals.buckets()[0];
        assert_eq!((oldest.year, oldest.month, oldest.month_offset), (2024, 9, 5));
        let newest = &totals.buckets()[5];
        assert_eq!((newest.year, newest.month, newest.month_offset), (2025, 2, 0));
        assert_eq!(totals.current(), 15.0);
        assert_eq!(totals.previous(), 7.0);
    }

    #[test]
    fn ignores_future_and_undated_records() {
        let mut undated = on(2025, 2, 1, 40.0);
        undated.collected_at = None;
        let records = vec![on(2025, 3, 1, 99.0), undated, on(2025, 2, 3, 1.5)];

        let totals = monthly_totals(&records, 3, today());

        assert_eq!(totals.weights(), vec![0.0, 0.0, 1.5]);
    }

    #[test]
    fn same_month_of_previous_year_is_not_current() {
        let records = vec![on(2024, 2, 10, 50.0)];
        let totals = monthly_totals(&records, 6, today());
        assert_eq!(totals.current(), 0.0);
    }
}
