use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub sheets: SheetsConfig,
    pub local_log: LocalLogConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct SheetsConfig {
    pub enabled: bool,
    pub credentials_path: PathBuf,
    pub spreadsheet_name: String,
    pub sheets_api_base: String,
    pub drive_api_base: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LocalLogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub sheets_enabled: Option<bool>,
    pub sheets_credentials_path: Option<PathBuf>,
    pub sheets_api_base: Option<String>,
    pub drive_api_base: Option<String>,
    pub local_log_path: Option<PathBuf>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig { path: PathBuf::from("catalog_tags.json") },
            sheets: SheetsConfig {
                enabled: true,
                credentials_path: PathBuf::from("service_account.json"),
                spreadsheet_name: "Hilight_db".to_string(),
                sheets_api_base: "https://sheets.googleapis.com".to_string(),
                drive_api_base: "https://www.googleapis.com".to_string(),
                timeout_secs: 15,
            },
            local_log: LocalLogConfig { path: PathBuf::from("local_log.xlsx") },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("hilight.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = path;
            }
        }

        if let Some(sheets) = patch.sheets {
            if let Some(enabled) = sheets.enabled {
                self.sheets.enabled = enabled;
            }
            if let Some(credentials_path) = sheets.credentials_path {
                self.sheets.credentials_path = credentials_path;
            }
            if let Some(spreadsheet_name) = sheets.spreadsheet_name {
                self.sheets.spreadsheet_name = spreadsheet_name;
            }
            if let Some(sheets_api_base) = sheets.sheets_api_base {
                self.sheets.sheets_api_base = sheets_api_base;
            }
            if let Some(drive_api_base) = sheets.drive_api_base {
                self.sheets.drive_api_base = drive_api_base;
            }
            if let Some(timeout_secs) = sheets.timeout_secs {
                self.sheets.timeout_secs = timeout_secs;
            }
        }

        if let Some(local_log) = patch.local_log {
            if let Some(path) = local_log.path {
                self.local_log.path = path;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("HILIGHT_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("HILIGHT_SHEETS_ENABLED") {
            self.sheets.enabled = parse_bool("HILIGHT_SHEETS_ENABLED", &value)?;
        }
        if let Some(value) = read_env("HILIGHT_SHEETS_CREDENTIALS_PATH") {
            self.sheets.credentials_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("HILIGHT_SHEETS_SPREADSHEET_NAME") {
            self.sheets.spreadsheet_name = value;
        }
        if let Some(value) = read_env("HILIGHT_SHEETS_API_BASE") {
            self.sheets.sheets_api_base = value;
        }
        if let Some(value) = read_env("HILIGHT_SHEETS_DRIVE_API_BASE") {
            self.sheets.drive_api_base = value;
        }
        if let Some(value) = read_env("HILIGHT_SHEETS_TIMEOUT_SECS") {
            self.sheets.timeout_secs = parse_u64("HILIGHT_SHEETS_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("HILIGHT_LOCAL_LOG_PATH") {
            self.local_log.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("HILIGHT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("HILIGHT_SERVER_PORT") {
            self.server.port = parse_u16("HILIGHT_SERVER_PORT", &value)?;
        }

        let log_level =
            read_env("HILIGHT_LOGGING_LEVEL").or_else(|| read_env("HILIGHT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("HILIGHT_LOGGING_FORMAT").or_else(|| read_env("HILIGHT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(enabled) = overrides.sheets_enabled {
            self.sheets.enabled = enabled;
        }
        if let Some(credentials_path) = overrides.sheets_credentials_path {
            self.sheets.credentials_path = credentials_path;
        }
        if let Some(sheets_api_base) = overrides.sheets_api_base {
            self.sheets.sheets_api_base = sheets_api_base;
        }
        if let Some(drive_api_base) = overrides.drive_api_base {
            self.sheets.drive_api_base = drive_api_base;
        }
        if let Some(local_log_path) = overrides.local_log_path {
            self.local_log.path = local_log_path;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_catalog(&self.catalog)?;
        validate_sheets(&self.sheets)?;
        validate_local_log(&self.local_log)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The config file `AppConfig::load` would read for `explicit_path`, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("hilight.toml"), PathBuf::from("config/hilight.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_sheets(sheets: &SheetsConfig) -> Result<(), ConfigError> {
    if sheets.spreadsheet_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sheets.spreadsheet_name must not be empty".to_string(),
        ));
    }

    let bases = [
        ("sheets.sheets_api_base", &sheets.sheets_api_base),
        ("sheets.drive_api_base", &sheets.drive_api_base),
    ];
    for (key, base) in bases {
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    if sheets.timeout_secs == 0 || sheets.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "sheets.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if sheets.enabled && sheets.credentials_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "sheets.credentials_path must not be empty when sheets.enabled is true".to_string(),
        ));
    }

    Ok(())
}

fn validate_local_log(local_log: &LocalLogConfig) -> Result<(), ConfigError> {
    if local_log.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("local_log.path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    sheets: Option<SheetsPatch>,
    local_log: Option<LocalLogPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct SheetsPatch {
    enabled: Option<bool>,
    credentials_path: Option<PathBuf>,
    spreadsheet_name: Option<String>,
    sheets_api_base: Option<String>,
    drive_api_base: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LocalLogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_point_at_conventional_files() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.catalog.path == PathBuf::from("catalog_tags.json"), "default catalog path")?;
        ensure(config.sheets.spreadsheet_name == "Hilight_db", "default spreadsheet name")?;
        ensure(config.local_log.path == PathBuf::from("local_log.xlsx"), "default local log")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default format compact")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_HILIGHT_CREDENTIALS", "/secrets/service_account.json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("hilight.toml");
            fs::write(
                &path,
                r#"
[sheets]
credentials_path = "${TEST_HILIGHT_CREDENTIALS}"
spreadsheet_name = "Hilight_staging"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.sheets.credentials_path == PathBuf::from("/secrets/service_account.json"),
                "credentials path should be interpolated from environment",
            )?;
            ensure(
                config.sheets.spreadsheet_name == "Hilight_staging",
                "spreadsheet name should come from file",
            )
        })();

        clear_vars(&["TEST_HILIGHT_CREDENTIALS"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HILIGHT_LOG_LEVEL", "warn");
        env::set_var("HILIGHT_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(&["HILIGHT_LOG_LEVEL", "HILIGHT_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HILIGHT_CATALOG_PATH", "from-env.json");
        env::set_var("HILIGHT_SERVER_PORT", "9090");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("hilight.toml");
            fs::write(
                &path,
                r#"
[catalog]
path = "from-file.json"

[server]
port = 7070

[local_log]
path = "from-file.xlsx"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    catalog_path: Some(PathBuf::from("from-override.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.path == PathBuf::from("from-override.json"),
                "override catalog path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 9090, "env port should win over file and defaults")?;
            ensure(
                config.local_log.path == PathBuf::from("from-file.xlsx"),
                "file local log path should win over defaults",
            )
        })();

        clear_vars(&["HILIGHT_CATALOG_PATH", "HILIGHT_SERVER_PORT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HILIGHT_SHEETS_API_BASE", "sheets.googleapis.com");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("sheets.sheets_api_base")
            );
            ensure(has_message, "validation failure should mention sheets.sheets_api_base")
        })();

        clear_vars(&["HILIGHT_SHEETS_API_BASE"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("HILIGHT_SHEETS_TIMEOUT_SECS", "soon");

        let result = (|| -> Result<(), String> {
            let rejected = matches!(
                AppConfig::load(LoadOptions::default()),
                Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "HILIGHT_SHEETS_TIMEOUT_SECS"
            );
            ensure(rejected, "non-numeric timeout should be rejected")
        })();

        clear_vars(&["HILIGHT_SHEETS_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("hilight.toml");
        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "missing required file should be reported",
        )
    }
}
