use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use tokio::sync::RwLock;

use salespulse_core::domain::forecast::HistoricalPoint;
use salespulse_core::errors::ForecastError;
use salespulse_core::forecast::DailyTotalsSource;

/// Serves a fixed daily series from memory.
///
/// The lookback window is measured back from `today` (the current UTC date
/// unless pinned with [`InMemoryDailyTotalsSource::anchored_at`]). A failure
/// message set through [`InMemoryDailyTotalsSource::fail_with`] is returned
/// from every load until [`InMemoryDailyTotalsSource::recover`] is called.
#[derive(Default)]
pub struct InMemoryDailyTotalsSource {
    points: RwLock<Vec<HistoricalPoint>>,
    failure: RwLock<Option<String>>,
    today: Option<NaiveDate>,
    loads: AtomicUsize,
}

impl InMemoryDailyTotalsSource {
    pub fn new(mut points: Vec<HistoricalPoint>) -> Self {
        points.sort_by_key(|point| point.date);
        Self { points: RwLock::new(points), ..Self::default() }
    }

    pub fn anchored_at(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub async fn replace(&self, mut points: Vec<HistoricalPoint>) {
        points.sort_by_key(|point| point.date);
        *self.points.write().await = points;
    }

    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Number of load calls served so far, failures included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DailyTotalsSource for InMemoryDailyTotalsSource {
    async fn load_daily_totals(
        &self,
        lookback_days: u32,
    ) -> Result<Vec<HistoricalPoint>, ForecastError> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.failure.read().await.clone() {
            return Err(ForecastError::Source(message));
        }

        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        let cutoff = today.checked_sub_days(Days::new(u64::from(lookback_days))).unwrap_or(today);

        let points = self.points.read().await;
        Ok(points.iter().filter(|point| point.date >= cutoff).cloned().collect())
    }
}
