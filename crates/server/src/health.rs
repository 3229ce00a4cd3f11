use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use salespulse_core::forecast::ForecastService;
use salespulse_db::DbPool;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    forecast: ForecastService,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub forecast_cache: HealthCheck,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, forecast: ForecastService) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, forecast })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let ready = database.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "salespulse-server runtime initialized".to_string(),
        },
        database,
        forecast_cache: cache_check(&state.forecast).await,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match salespulse_db::ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

// Informational only: a cold cache never degrades readiness.
async fn cache_check(forecast: &ForecastService) -> HealthCheck {
    match forecast.cache().entry().await {
        Some(entry) => {
            let age = (Utc::now() - entry.timestamp).num_seconds().max(0);
            HealthCheck { status: "warm", detail: format!("payload cached {age}s ago") }
        }
        None => HealthCheck { status: "cold", detail: "no forecast computed yet".to_string() },
    }
}
