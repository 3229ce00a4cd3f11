use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use salespulse_core::errors::{ApplicationError, InterfaceError};
use salespulse_core::forecast::ForecastService;
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ForecastState {
    service: ForecastService,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForecastErrorBody {
    pub error: String,
    pub correlation_id: String,
}

pub fn router(service: ForecastService) -> Router {
    Router::new()
        .route("/api/v1/forecast", get(get_forecast))
        .with_state(ForecastState { service })
}

async fn get_forecast(State(state): State<ForecastState>) -> Response {
    match state.service.get_forecast().await {
        Ok(payload) => (StatusCode::OK, Json(payload.as_ref())).into_response(),
        Err(failure) => {
            let correlation_id = format!("req-{}", Uuid::new_v4().simple());
            let interface = ApplicationError::from(failure).into_interface(correlation_id);
            error_response(interface)
        }
    }
}

fn error_response(interface: InterfaceError) -> Response {
    let status = match &interface {
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if matches!(interface, InterfaceError::Internal { .. }) {
        error!(
            event_name = "forecast.request.failed",
            correlation_id = %interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "forecast request failed"
        );
    } else {
        warn!(
            event_name = "forecast.request.failed",
            correlation_id = %interface.correlation_id(),
            status = status.as_u16(),
            error = %interface,
            "forecast request failed"
        );
    }

    let body = ForecastErrorBody {
        error: interface.user_message().to_string(),
        correlation_id: interface.correlation_id().to_string(),
    };
    (status, Json(body)).into_response()
}
