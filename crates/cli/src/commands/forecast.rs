use std::sync::Arc;

use salespulse_core::config::LoadOptions;
use salespulse_core::errors::ForecastError;
use salespulse_core::forecast::{Clock, ForecastService, SystemClock};
use salespulse_core::ForecastPayload;
use salespulse_db::SqlDailyTotalsRepository;

use crate::commands::{open_migrated_pool, prepare, CommandResult, StepFailure};

/// Computes a fresh forecast from the configured database.
///
/// Output is the payload as pretty JSON followed by the outcome line, so the
/// last line stays machine-readable like every other command.
pub fn run(horizon_days: Option<u32>) -> CommandResult {
    let mut options = LoadOptions::default();
    options.overrides.forecast_horizon_days = horizon_days;
    run_with(options)
}

pub fn run_with(options: LoadOptions) -> CommandResult {
    let (config, runtime) = match prepare(options) {
        Ok(prepared) => prepared,
        Err(failure) => return failure.into_result("forecast"),
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let source = SqlDailyTotalsRepository::new(pool.clone()).with_clock(clock.clone());
        let service =
            ForecastService::new(Arc::new(source), config.forecast.clone()).with_clock(clock);

        let payload = service.get_forecast().await.map_err(forecast_failure);
        pool.close().await;
        payload
    });

    let payload = match result {
        Ok(payload) => payload,
        Err(failure) => return failure.into_result("forecast"),
    };

    let rendered = match serde_json::to_string_pretty(payload.as_ref()) {
        Ok(rendered) => rendered,
        Err(error) => {
            return CommandResult::failure(
                "forecast",
                "serialization",
                format!("could not render forecast payload: {error}"),
                9,
            );
        }
    };

    let outcome = CommandResult::success("forecast", summary_message(&payload));
    CommandResult {
        exit_code: outcome.exit_code,
        output: format!("{rendered}\n{}", outcome.output),
    }
}

fn forecast_failure(error: ForecastError) -> StepFailure {
    match error {
        ForecastError::Source(_) => StepFailure::new("forecast_source", error, 7),
        ForecastError::NonFinite { .. } => StepFailure::new("forecast_invalid", error, 8),
    }
}

fn summary_message(payload: &ForecastPayload) -> String {
    if payload.is_empty() {
        return "no qualifying order history; returned an empty forecast".to_string();
    }

    format!(
        "forecast computed from {} history days for {} days ahead; \
         revenue {:.2} ({:+.1}%), orders {:.1} ({:+.1}%)",
        payload.history_days,
        payload.forecast.len(),
        payload.summary.revenue_forecast,
        payload.summary.revenue_growth_pct,
        payload.summary.orders_forecast,
        payload.summary.orders_growth_pct,
    )
}
