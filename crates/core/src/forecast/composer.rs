use chrono::{Days, NaiveDate};

use crate::domain::forecast::{ForecastPoint, HistoricalPoint};
use crate::forecast::seasonality::SeasonalityProfile;
use crate::forecast::trend::RegressionResult;
use crate::forecast::ForecastSettings;

/// Projects `settings.horizon_days` daily points past the last historical date.
///
/// Trend values are floored at zero before the seasonal factor is applied; the
/// band is `estimate ± confidence_z * std_dev` with only the lower edge clamped.
pub fn compose_forecast(
    history: &[HistoricalPoint],
    revenue_fit: &RegressionResult,
    orders_fit: &RegressionResult,
    profile: &SeasonalityProfile,
    settings: &ForecastSettings,
) -> Vec<ForecastPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };

    let revenue_half_width = settings.confidence_z * revenue_fit.std_dev;
    let orders_half_width = settings.confidence_z * orders_fit.std_dev;
    let history_len = history.len();

    (0..settings.horizon_days)
        .map_while(|offset| {
            let date = day_after(last.date, offset)?;
            let x = (history_len + offset as usize) as f64;
            let factor = profile.factor(date);

            let revenue = revenue_fit.predict(x).max(0.0) * factor;
            let orders = orders_fit.predict(x).max(0.0) * factor;
            let (revenue_lower, revenue_upper) = band(revenue, revenue_half_width);
            let (orders_lower, orders_upper) = band(orders, orders_half_width);

            Some(ForecastPoint {
                date,
                revenue,
                orders,
                revenue_lower,
                revenue_upper,
                orders_lower,
                orders_upper,
            })
        })
        .collect()
}

fn day_after(last: NaiveDate, offset: u32) -> Option<NaiveDate> {
    last.checked_add_days(Days::new(u64::from(offset) + 1))
}

fn band(estimate: f64, half_width: f64) -> (f64, f64) {
    ((estimate - half_width).max(0.0), estimate + half_width)
}
