use crate::domain::forecast::{ForecastPoint, ForecastSummary, HistoricalPoint};

/// Totals the forecast and compares it with the trailing `horizon_days` of raw history.
pub fn summarize(
    history: &[HistoricalPoint],
    forecast: &[ForecastPoint],
    horizon_days: u32,
) -> ForecastSummary {
    let revenue_forecast: f64 = forecast.iter().map(|point| point.revenue).sum();
    let orders_forecast: f64 = forecast.iter().map(|point| point.orders).sum();

    let trailing_start = history.len().saturating_sub(horizon_days as usize);
    let trailing = &history[trailing_start..];
    let revenue_last_quarter: f64 = trailing.iter().map(|point| point.revenue).sum();
    let orders_last_quarter = trailing.iter().map(|point| point.orders).sum::<u64>() as f64;

    ForecastSummary {
        revenue_forecast,
        orders_forecast,
        revenue_last_quarter,
        orders_last_quarter,
        revenue_growth_pct: growth_pct(revenue_forecast, revenue_last_quarter),
        orders_growth_pct: growth_pct(orders_forecast, orders_last_quarter),
    }
}

/// Percentage change from `baseline` to `projected`; zero when there is no baseline.
pub fn growth_pct(projected: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (projected - baseline) / baseline * 100.0
}
