use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::forecast::HistoricalPoint;

/// Multiplicative weekday and month-of-year factors relative to the overall mean.
///
/// Weekdays are indexed Monday = 0 through Sunday = 6, months January = 0 through
/// December = 11. Buckets without observations stay neutral at 1.0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityProfile {
    pub weekday: [f64; 7],
    pub month: [f64; 12],
}

impl Default for SeasonalityProfile {
    fn default() -> Self {
        Self { weekday: [1.0; 7], month: [1.0; 12] }
    }
}

impl SeasonalityProfile {
    /// Derives the profile from the unsmoothed daily revenue series.
    pub fn from_history(history: &[HistoricalPoint]) -> Self {
        if history.is_empty() {
            return Self::default();
        }

        let overall_mean =
            history.iter().map(|point| point.revenue).sum::<f64>() / history.len() as f64;
        if !overall_mean.is_finite() || overall_mean <= 0.0 {
            return Self::default();
        }

        let mut weekday = BucketTotals::<7>::default();
        let mut month = BucketTotals::<12>::default();
        for point in history {
            weekday.add(weekday_index(point.date), point.revenue);
            month.add(month_index(point.date), point.revenue);
        }

        Self { weekday: weekday.multipliers(overall_mean), month: month.multipliers(overall_mean) }
    }

    /// Combined adjustment for a date, assuming weekday and month effects are independent.
    pub fn factor(&self, date: NaiveDate) -> f64 {
        self.weekday[weekday_index(date)] * self.month[month_index(date)]
    }
}

fn weekday_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}

struct BucketTotals<const N: usize> {
    sums: [f64; N],
    counts: [u32; N],
}

impl<const N: usize> Default for BucketTotals<N> {
    fn default() -> Self {
        Self { sums: [0.0; N], counts: [0; N] }
    }
}

impl<const N: usize> BucketTotals<N> {
    fn add(&mut self, bucket: usize, value: f64) {
        self.sums[bucket] += value;
        self.counts[bucket] += 1;
    }

    fn multipliers(&self, overall_mean: f64) -> [f64; N] {
        let mut multipliers = [1.0; N];
        for (bucket, multiplier) in multipliers.iter_mut().enumerate() {
            let count = self.counts[bucket];
            if count > 0 {
                *multiplier = (self.sums[bucket] / f64::from(count)) / overall_mean;
            }
        }
        multipliers
    }
}
