use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use salespulse_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: fn(&AppConfig) -> String,
}

const FIELDS: &[Field] = &[
    Field {
        key_path: "database.url",
        env_keys: &["SALESPULSE_DATABASE_URL"],
        value: |config| config.database.url.clone(),
    },
    Field {
        key_path: "database.max_connections",
        env_keys: &["SALESPULSE_DATABASE_MAX_CONNECTIONS"],
        value: |config| config.database.max_connections.to_string(),
    },
    Field {
        key_path: "database.timeout_secs",
        env_keys: &["SALESPULSE_DATABASE_TIMEOUT_SECS"],
        value: |config| config.database.timeout_secs.to_string(),
    },
    Field {
        key_path: "server.bind_address",
        env_keys: &["SALESPULSE_SERVER_BIND_ADDRESS"],
        value: |config| config.server.bind_address.clone(),
    },
    Field {
        key_path: "server.port",
        env_keys: &["SALESPULSE_SERVER_PORT"],
        value: |config| config.server.port.to_string(),
    },
    Field {
        key_path: "server.graceful_shutdown_secs",
        env_keys: &["SALESPULSE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        value: |config| config.server.graceful_shutdown_secs.to_string(),
    },
    Field {
        key_path: "logging.level",
        env_keys: &["SALESPULSE_LOGGING_LEVEL", "SALESPULSE_LOG_LEVEL"],
        value: |config| config.logging.level.clone(),
    },
    Field {
        key_path: "logging.format",
        env_keys: &["SALESPULSE_LOGGING_FORMAT", "SALESPULSE_LOG_FORMAT"],
        value: |config| format!("{:?}", config.logging.format).to_ascii_lowercase(),
    },
    Field {
        key_path: "forecast.history_window_days",
        env_keys: &["SALESPULSE_FORECAST_HISTORY_WINDOW_DAYS"],
        value: |config| config.forecast.history_window_days.to_string(),
    },
    Field {
        key_path: "forecast.horizon_days",
        env_keys: &["SALESPULSE_FORECAST_HORIZON_DAYS"],
        value: |config| config.forecast.horizon_days.to_string(),
    },
    Field {
        key_path: "forecast.rolling_window",
        env_keys: &["SALESPULSE_FORECAST_ROLLING_WINDOW"],
        value: |config| config.forecast.rolling_window.to_string(),
    },
    Field {
        key_path: "forecast.confidence_z",
        env_keys: &["SALESPULSE_FORECAST_CONFIDENCE_Z"],
        value: |config| config.forecast.confidence_z.to_string(),
    },
    Field {
        key_path: "forecast.cache_ttl_secs",
        env_keys: &["SALESPULSE_FORECAST_CACHE_TTL_SECS"],
        value: |config| config.forecast.cache_ttl_secs.to_string(),
    },
];

pub fn run() -> String {
    run_with(LoadOptions::default())
}

pub fn run_with(options: LoadOptions) -> String {
    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let file = config_file_path.as_deref().zip(config_file_doc.as_ref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(FIELDS.iter().map(|field| {
        let source = field_source(field, file);
        format!("- {} = {} (source: {source})", field.key_path, (field.value)(&config))
    }));
    lines.join("\n")
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    ["salespulse.toml", "config/salespulse.toml"]
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(field: &Field, file: Option<(&Path, &Value)>) -> String {
    if let Some(env_key) = field.env_keys.iter().find(|key| {
        env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
    }) {
        return format!("env ({env_key})");
    }

    match file {
        Some((path, doc)) if contains_path(doc, field.key_path) => {
            format!("file ({})", path.display())
        }
        _ => "default".to_string(),
    }
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path.split('.').try_fold(root, |current, key| current.get(key)).is_some()
}
