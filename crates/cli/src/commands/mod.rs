pub mod config;
pub mod forecast;
pub mod migrate;
pub mod seed;

use salespulse_core::config::{AppConfig, LoadOptions};
use salespulse_db::{connect_with_settings, migrations, DbPool};
use serde::Serialize;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'a str,
    error_class: Option<&'a str>,
    message: &'a str,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let outcome =
            CommandOutcome { command, status: "ok", error_class: None, message: &message };
        Self { exit_code: 0, output: serialize_outcome(&outcome) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let message = message.into();
        let outcome = CommandOutcome {
            command,
            status: "error",
            error_class: Some(error_class),
            message: &message,
        };
        Self { exit_code, output: serialize_outcome(&outcome) }
    }
}

/// A failed step inside a command, before it is rendered as an outcome line.
#[derive(Debug)]
pub(crate) struct StepFailure {
    pub error_class: &'static str,
    pub message: String,
    pub exit_code: u8,
}

impl StepFailure {
    pub(crate) fn new(error_class: &'static str, message: impl ToString, exit_code: u8) -> Self {
        Self { error_class, message: message.to_string(), exit_code }
    }

    pub(crate) fn into_result(self, command: &str) -> CommandResult {
        CommandResult::failure(command, self.error_class, self.message, self.exit_code)
    }
}

/// Loads configuration and a single-threaded runtime for one command run.
pub(crate) fn prepare(options: LoadOptions) -> Result<(AppConfig, Runtime), StepFailure> {
    let config = AppConfig::load(options).map_err(|error| {
        StepFailure::new("config_validation", format!("configuration issue: {error}"), 2)
    })?;

    let runtime =
        tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
            StepFailure::new(
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            )
        })?;

    Ok((config, runtime))
}

/// Connects to the configured database and brings the schema up to date.
pub(crate) async fn open_migrated_pool(config: &AppConfig) -> Result<DbPool, StepFailure> {
    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| StepFailure::new("db_connectivity", error, 4))?;

    migrations::run_pending(&pool).await.map_err(|error| StepFailure::new("migration", error, 5))?;
    Ok(pool)
}

fn serialize_outcome(outcome: &CommandOutcome<'_>) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|error| {
        serde_json::json!({
            "command": "unknown",
            "status": "error",
            "error_class": "serialization",
            "message": error.to_string(),
        })
        .to_string()
    })
}
