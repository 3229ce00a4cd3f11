use chrono::{DateTime, Utc};

use crate::domain::forecast::{ForecastPayload, HistoricalPoint};
use crate::forecast::composer::compose_forecast;
use crate::forecast::seasonality::SeasonalityProfile;
use crate::forecast::smoothing::rolling_average;
use crate::forecast::summary::summarize;
use crate::forecast::trend::linear_regression;
use crate::forecast::ForecastSettings;

/// Runs the full forecasting pipeline over an in-memory history.
///
/// An empty history short-circuits to [`ForecastPayload::empty`] before any
/// regression or seasonality work.
pub fn build_payload(
    history: Vec<HistoricalPoint>,
    settings: &ForecastSettings,
    generated_at: DateTime<Utc>,
) -> ForecastPayload {
    if history.is_empty() {
        return ForecastPayload::empty(generated_at, settings.horizon_days);
    }

    let revenue: Vec<f64> = history.iter().map(|point| point.revenue).collect();
    let orders: Vec<f64> = history.iter().map(|point| point.orders as f64).collect();

    let revenue_fit = linear_regression(&rolling_average(&revenue, settings.rolling_window));
    let orders_fit = linear_regression(&rolling_average(&orders, settings.rolling_window));
    let profile = SeasonalityProfile::from_history(&history);

    let forecast = compose_forecast(&history, &revenue_fit, &orders_fit, &profile, settings);
    let summary = summarize(&history, &forecast, settings.horizon_days);

    ForecastPayload {
        generated_at,
        horizon_days: settings.horizon_days,
        history_days: history.len(),
        history,
        forecast,
        summary,
    }
}
