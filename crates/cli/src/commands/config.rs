use std::env;
use std::fs;
use std::path::Path;

use hilight_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let credentials_state =
        if config.sheets.credentials_path.exists() { "<present>" } else { "<missing>" };

    let entries = [
        (
            "catalog.path",
            config.catalog.path.display().to_string(),
            source("catalog.path", &["HILIGHT_CATALOG_PATH"]),
        ),
        (
            "sheets.enabled",
            config.sheets.enabled.to_string(),
            source("sheets.enabled", &["HILIGHT_SHEETS_ENABLED"]),
        ),
        (
            "sheets.credentials_path",
            format!("{} {credentials_state}", config.sheets.credentials_path.display()),
            source("sheets.credentials_path", &["HILIGHT_SHEETS_CREDENTIALS_PATH"]),
        ),
        (
            "sheets.spreadsheet_name",
            config.sheets.spreadsheet_name.clone(),
            source("sheets.spreadsheet_name", &["HILIGHT_SHEETS_SPREADSHEET_NAME"]),
        ),
        (
            "sheets.sheets_api_base",
            config.sheets.sheets_api_base.clone(),
            source("sheets.sheets_api_base", &["HILIGHT_SHEETS_API_BASE"]),
        ),
        (
            "sheets.drive_api_base",
            config.sheets.drive_api_base.clone(),
            source("sheets.drive_api_base", &["HILIGHT_SHEETS_DRIVE_API_BASE"]),
        ),
        (
            "sheets.timeout_secs",
            config.sheets.timeout_secs.to_string(),
            source("sheets.timeout_secs", &["HILIGHT_SHEETS_TIMEOUT_SECS"]),
        ),
        (
            "local_log.path",
            config.local_log.path.display().to_string(),
            source("local_log.path", &["HILIGHT_LOCAL_LOG_PATH"]),
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", &["HILIGHT_SERVER_BIND_ADDRESS"]),
        ),
        (
            "server.port",
            config.server.port.to_string(),
            source("server.port", &["HILIGHT_SERVER_PORT"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["HILIGHT_LOGGING_LEVEL", "HILIGHT_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            source("logging.format", &["HILIGHT_LOGGING_FORMAT", "HILIGHT_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
