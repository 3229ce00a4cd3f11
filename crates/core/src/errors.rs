use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ForecastError {
    #[error("historical data load failed: {0}")]
    Source(String),
    #[error("forecast produced a non-finite value at `{field}`")]
    NonFinite { field: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    /// Maps to the user-facing error, tagged with the request's correlation id.
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        match self {
            Self::Forecast(ForecastError::Source(message)) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
            Self::Forecast(error @ ForecastError::NonFinite { .. }) => {
                InterfaceError::Internal { message: error.to_string(), correlation_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, ForecastError, InterfaceError};

    #[test]
    fn source_failure_maps_to_service_unavailable() {
        let interface =
            ApplicationError::from(ForecastError::Source("database lock timeout".to_owned()))
                .into_interface("req-2");

        assert!(matches!(
            interface,
            InterfaceError::ServiceUnavailable { ref message, .. }
                if message == "database lock timeout"
        ));
        assert_eq!(interface.correlation_id(), "req-2");
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn non_finite_forecast_maps_to_internal() {
        let interface = ApplicationError::from(ForecastError::NonFinite {
            field: "summary.revenueGrowthPct".to_owned(),
        })
        .into_interface("req-3");

        assert!(matches!(
            interface,
            InterfaceError::Internal { ref message, .. } if message.contains("revenueGrowthPct")
        ));
        assert_eq!(interface.correlation_id(), "req-3");
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn user_message_never_echoes_internal_detail() {
        let interface =
            ApplicationError::from(ForecastError::Source("/var/db/sales.db locked".to_owned()))
                .into_interface("req-4");

        assert!(!interface.user_message().contains("sales.db"));
    }
}
