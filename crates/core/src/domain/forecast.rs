use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ForecastError;

/// One calendar day of qualifying order activity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: u64,
}

impl HistoricalPoint {
    pub fn new(date: NaiveDate, revenue: f64, orders: u64) -> Self {
        Self { date, revenue, orders }
    }
}

/// Projected values for one future day, with an ~80% confidence band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: f64,
    pub revenue_lower: f64,
    pub revenue_upper: f64,
    pub orders_lower: f64,
    pub orders_upper: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub revenue_forecast: f64,
    pub orders_forecast: f64,
    pub revenue_last_quarter: f64,
    pub orders_last_quarter: f64,
    pub revenue_growth_pct: f64,
    pub orders_growth_pct: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPayload {
    pub generated_at: DateTime<Utc>,
    pub horizon_days: u32,
    pub history_days: usize,
    pub history: Vec<HistoricalPoint>,
    pub forecast: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
}

impl ForecastPayload {
    /// Payload returned when the order store has no qualifying days.
    pub fn empty(generated_at: DateTime<Utc>, horizon_days: u32) -> Self {
        Self {
            generated_at,
            horizon_days,
            history_days: 0,
            history: Vec::new(),
            forecast: Vec::new(),
            summary: ForecastSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Rejects payloads carrying NaN or infinite values anywhere.
    pub fn ensure_finite(&self) -> Result<(), ForecastError> {
        for (index, point) in self.history.iter().enumerate() {
            check_finite(|| format!("history[{index}].revenue"), point.revenue)?;
        }

        for (index, point) in self.forecast.iter().enumerate() {
            let fields = [
                ("revenue", point.revenue),
                ("orders", point.orders),
                ("revenueLower", point.revenue_lower),
                ("revenueUpper", point.revenue_upper),
                ("ordersLower", point.orders_lower),
                ("ordersUpper", point.orders_upper),
            ];
            for (name, value) in fields {
                check_finite(|| format!("forecast[{index}].{name}"), value)?;
            }
        }

        let summary = &self.summary;
        let fields = [
            ("revenueForecast", summary.revenue_forecast),
            ("ordersForecast", summary.orders_forecast),
            ("revenueLastQuarter", summary.revenue_last_quarter),
            ("ordersLastQuarter", summary.orders_last_quarter),
            ("revenueGrowthPct", summary.revenue_growth_pct),
            ("ordersGrowthPct", summary.orders_growth_pct),
        ];
        for (name, value) in fields {
            check_finite(|| format!("summary.{name}"), value)?;
        }

        Ok(())
    }
}

fn check_finite(field: impl FnOnce() -> String, value: f64) -> Result<(), ForecastError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ForecastError::NonFinite { field: field() })
    }
}
