use std::sync::Arc;

use salespulse_core::config::{AppConfig, ConfigError};
use salespulse_core::forecast::{Clock, ForecastService, SystemClock};
use salespulse_db::{connect_with_settings, migrations, DbPool, SqlDailyTotalsRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub forecast: ForecastService,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let source = SqlDailyTotalsRepository::new(db_pool.clone()).with_clock(clock.clone());
    let forecast =
        ForecastService::new(Arc::new(source), config.forecast.clone()).with_clock(clock);
    info!(
        event_name = "system.bootstrap.forecast_ready",
        correlation_id = "bootstrap",
        horizon_days = config.forecast.horizon_days,
        cache_ttl_secs = config.forecast.cache_ttl_secs,
        "forecast service constructed"
    );

    Ok(Application { config, db_pool, forecast })
}
