use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use salespulse_cli::commands::{config, forecast, migrate, seed};
use salespulse_core::config::LoadOptions;
use serde_json::Value;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("SALESPULSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
    });
}

#[test]
fn migrate_rejects_non_sqlite_database_url() {
    with_env(&[("SALESPULSE_DATABASE_URL", "postgres://localhost/sales")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = sqlite_url(&dir.path().join("seed.db"));

    with_env(&[("SALESPULSE_DATABASE_URL", url.as_str())], || {
        let first = seed::run(60);
        assert_eq!(first.exit_code, 0, "first seed failed: {}", first.output);
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["status"], "ok");
        assert!(first_payload["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("demo sales loaded:")));

        let second = seed::run(60);
        assert_eq!(second.exit_code, 0, "second seed failed: {}", second.output);
        assert_eq!(first_payload["message"], parse_payload(&second.output)["message"]);
    });
}

#[test]
fn seed_rejects_zero_days() {
    with_env(&[("SALESPULSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = seed::run(0);
        assert_eq!(result.exit_code, 2);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_argument");
    });
}

#[test]
fn forecast_after_seed_prints_payload_then_outcome() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = sqlite_url(&dir.path().join("forecast.db"));

    with_env(&[("SALESPULSE_DATABASE_URL", url.as_str())], || {
        assert_eq!(seed::run(120).exit_code, 0);

        let result = forecast::run(Some(30));
        assert_eq!(result.exit_code, 0, "forecast failed: {}", result.output);

        let outcome = parse_payload(last_line(&result.output));
        assert_eq!(outcome["command"], "forecast");
        assert_eq!(outcome["status"], "ok");

        let body = &result.output[..result.output.len() - last_line(&result.output).len()];
        let payload: Value = serde_json::from_str(body.trim_end()).expect("payload JSON");
        assert_eq!(payload["horizonDays"], 30);
        assert_eq!(payload["forecast"].as_array().map(Vec::len), Some(30));
        assert!(payload["historyDays"].as_u64().is_some_and(|days| days > 100));
    });
}

#[test]
fn forecast_on_empty_store_reports_empty_payload() {
    with_env(&[("SALESPULSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = forecast::run(None);
        assert_eq!(result.exit_code, 0);

        let outcome = parse_payload(last_line(&result.output));
        assert_eq!(
            outcome["message"],
            "no qualifying order history; returned an empty forecast"
        );
    });
}

#[test]
fn forecast_rejects_malformed_env_override() {
    with_env(
        &[
            ("SALESPULSE_DATABASE_URL", "sqlite::memory:"),
            ("SALESPULSE_FORECAST_ROLLING_WINDOW", "weekly"),
        ],
        || {
            let result = forecast::run(None);
            assert_eq!(result.exit_code, 2);
            assert_eq!(parse_payload(&result.output)["error_class"], "config_validation");
        },
    );
}

#[test]
fn config_attributes_values_to_env_file_and_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("salespulse.toml");
    std::fs::write(&path, "[forecast]\nhorizon_days = 45\n").expect("write config");

    with_env(&[("SALESPULSE_LOG_LEVEL", "debug")], || {
        let output = config::run_with(LoadOptions {
            config_path: Some(path.clone()),
            ..LoadOptions::default()
        });

        let file_line = format!("- forecast.horizon_days = 45 (source: file ({}))", path.display());
        assert!(output.contains(&file_line), "missing file attribution in:\n{output}");
        assert!(output.contains("- logging.level = debug (source: env (SALESPULSE_LOG_LEVEL))"));
        assert!(output.contains("- forecast.confidence_z = 1.282 (source: default)"));
    });
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poison| poison.into_inner());

    let keys = [
        "SALESPULSE_DATABASE_URL",
        "SALESPULSE_DATABASE_MAX_CONNECTIONS",
        "SALESPULSE_DATABASE_TIMEOUT_SECS",
        "SALESPULSE_SERVER_BIND_ADDRESS",
        "SALESPULSE_SERVER_PORT",
        "SALESPULSE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SALESPULSE_LOGGING_LEVEL",
        "SALESPULSE_LOGGING_FORMAT",
        "SALESPULSE_LOG_LEVEL",
        "SALESPULSE_LOG_FORMAT",
        "SALESPULSE_FORECAST_HISTORY_WINDOW_DAYS",
        "SALESPULSE_FORECAST_HORIZON_DAYS",
        "SALESPULSE_FORECAST_ROLLING_WINDOW",
        "SALESPULSE_FORECAST_CONFIDENCE_Z",
        "SALESPULSE_FORECAST_CACHE_TTL_SECS",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
