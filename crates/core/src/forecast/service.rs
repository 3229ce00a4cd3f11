use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::forecast::ForecastPayload;
use crate::errors::ForecastError;
use crate::forecast::cache::{CacheOutcome, ForecastCache};
use crate::forecast::clock::{Clock, SystemClock};
use crate::forecast::pipeline::build_payload;
use crate::forecast::{DailyTotalsSource, ForecastSettings};

/// Entry point for callers that need the current forecast.
///
/// Construct once per process and share it; the cache it holds is the only
/// state that survives between requests.
#[derive(Clone)]
pub struct ForecastService {
    source: Arc<dyn DailyTotalsSource>,
    cache: Arc<ForecastCache>,
    clock: Arc<dyn Clock>,
    settings: ForecastSettings,
}

impl ForecastService {
    /// Builds the service with a cache whose TTL is `settings.cache_ttl_secs`.
    pub fn new(source: Arc<dyn DailyTotalsSource>, settings: ForecastSettings) -> Self {
        let cache = Arc::new(ForecastCache::new(settings.cache_ttl()));
        Self { source, cache, clock: Arc::new(SystemClock), settings }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    /// Returns the cached payload while it is younger than the TTL, otherwise
    /// recomputes it from the data source. Failures are never cached.
    pub async fn get_forecast(&self) -> Result<Arc<ForecastPayload>, ForecastError> {
        let clock = self.clock.clone();
        let (payload, outcome) =
            self.cache.get_or_refresh(move || clock.now(), || self.compute()).await?;

        let coalesced = outcome == CacheOutcome::Coalesced;
        match outcome {
            CacheOutcome::Hit | CacheOutcome::Coalesced => debug!(
                event_name = "forecast.cache.hit",
                correlation_id = "forecast",
                coalesced,
                generated_at = %payload.generated_at,
                "serving cached forecast"
            ),
            CacheOutcome::Refreshed => info!(
                event_name = "forecast.cache.refreshed",
                correlation_id = "forecast",
                history_days = payload.history_days,
                forecast_days = payload.forecast.len(),
                generated_at = %payload.generated_at,
                "forecast cache refreshed"
            ),
        }

        Ok(payload)
    }

    async fn compute(&self) -> Result<ForecastPayload, ForecastError> {
        info!(
            event_name = "forecast.cache.miss",
            correlation_id = "forecast",
            lookback_days = self.settings.history_window_days,
            "recomputing forecast"
        );

        let history = self
            .source
            .load_daily_totals(self.settings.history_window_days)
            .await
            .map_err(|error| {
                warn!(
                    event_name = "forecast.source.failed",
                    correlation_id = "forecast",
                    error = %error,
                    "historical data load failed"
                );
                error
            })?;

        if history.is_empty() {
            info!(
                event_name = "forecast.pipeline.empty_history",
                correlation_id = "forecast",
                "no qualifying order history; caching empty forecast"
            );
        }

        let payload = build_payload(history, &self.settings, self.clock.now());
        payload.ensure_finite().map_err(|error| {
            warn!(
                event_name = "forecast.pipeline.non_finite",
                correlation_id = "forecast",
                error = %error,
                "forecast rejected before caching"
            );
            error
        })?;

        debug!(
            event_name = "forecast.pipeline.computed",
            correlation_id = "forecast",
            revenue_forecast = payload.summary.revenue_forecast,
            revenue_growth_pct = payload.summary.revenue_growth_pct,
            "forecast pipeline completed"
        );

        Ok(payload)
    }
}
