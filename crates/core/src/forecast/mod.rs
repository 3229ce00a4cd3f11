//! Revenue and order-volume forecasting.
//!
//! Daily history flows through a fixed pipeline: trailing smoothing, an OLS
//! trend per series, a multiplicative weekday/month profile from the raw
//! series, then a horizon projection with a symmetric confidence band. The
//! resulting payload is memoized by [`ForecastCache`] and served through
//! [`ForecastService`].

pub mod cache;
pub mod clock;
pub mod composer;
pub mod pipeline;
pub mod seasonality;
pub mod service;
pub mod smoothing;
pub mod summary;
pub mod trend;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::forecast::HistoricalPoint;
use crate::errors::ForecastError;

pub use cache::{CacheEntry, CacheOutcome, ForecastCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use composer::compose_forecast;
pub use pipeline::build_payload;
pub use seasonality::SeasonalityProfile;
pub use service::ForecastService;
pub use smoothing::rolling_average;
pub use summary::{growth_pct, summarize};
pub use trend::{linear_regression, RegressionResult};

pub const HISTORY_WINDOW_DAYS: u32 = 730;
pub const FORECAST_DAYS: u32 = 90;
pub const ROLLING_WINDOW: usize = 7;
/// Two-sided z-score for an ~80% interval.
pub const CONFIDENCE_Z: f64 = 1.282;
pub const CACHE_TTL_SECS: u64 = 3600;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastSettings {
    pub history_window_days: u32,
    pub horizon_days: u32,
    pub rolling_window: usize,
    pub confidence_z: f64,
    pub cache_ttl_secs: u64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            history_window_days: HISTORY_WINDOW_DAYS,
            horizon_days: FORECAST_DAYS,
            rolling_window: ROLLING_WINDOW,
            confidence_z: CONFIDENCE_Z,
            cache_ttl_secs: CACHE_TTL_SECS,
        }
    }
}

impl ForecastSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Supplies one row per calendar day with qualifying orders, oldest first.
#[async_trait]
pub trait DailyTotalsSource: Send + Sync {
    async fn load_daily_totals(
        &self,
        lookback_days: u32,
    ) -> Result<Vec<HistoricalPoint>, ForecastError>;
}
