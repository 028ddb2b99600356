//! Configuration loader
//!
//! Loads application configuration from environment variables and files.
//!
//! ## Loading Strategy
//! 1. A `.env` file in the working directory (or a parent) is read into the
//!    process environment when present
//! 2. The first config file found by [`probe_config_paths`] is parsed; when
//!    none exists the defaults are used
//! 3. `LUTEM_*` environment variables override individual values
//! 4. The merged configuration is validated
//!
//! ## Environment Variables
//! - `LUTEM_API_BASE_URL`: Remote API base URL
//! - `LUTEM_API_TIMEOUT_SECS`: Transport timeout per attempt
//! - `LUTEM_API_USER_AGENT`: User agent sent with every request
//! - `LUTEM_RETRY_MAX_ATTEMPTS`: Retries after the first attempt
//! - `LUTEM_RETRY_BASE_DELAY_MS`: Delay before the first retry
//! - `LUTEM_RETRY_MAX_DELAY_MS`: Ceiling for any retry delay
//! - `LUTEM_STATE_PATH`: File holding the persisted connection record
//! - `LUTEM_STATE_NAMESPACE`: Key of the record inside that file
//! - `LUTEM_LOG_LEVEL`: Default log filter (`RUST_LOG` still wins)
//! - `LUTEM_LOG_JSON`: Emit JSON lines (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./lutem.json`, `./lutem.toml`, `./config.json`, `./config.toml`
//! 2. The same names one and two directories up
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use lutem_domain::{LutemConfig, LutemError, Result};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["lutem.json", "lutem.toml", "config.json", "config.toml"];

/// Load configuration from `.env`, the first config file found and the
/// environment, in increasing order of precedence.
///
/// # Errors
/// Returns `LutemError::Config` if a file or variable is invalid, or the
/// merged configuration fails validation.
pub fn load() -> Result<LutemConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, using defaults");
            LutemConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::info!(base_url = %config.api.base_url, "Configuration loaded");
    Ok(config)
}

/// Load configuration from defaults and environment variables only.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `LutemError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<LutemConfig> {
    let mut config = LutemConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension). Missing
/// sections and fields fall back to their defaults.
///
/// # Errors
/// Returns `LutemError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<LutemConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(LutemError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            LutemError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| LutemError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `LutemError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<LutemConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| LutemError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(LutemError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Overlay `LUTEM_*` variables onto `config`.
fn apply_env_overrides(config: &mut LutemConfig) -> Result<()> {
    if let Some(base_url) = env_string("LUTEM_API_BASE_URL") {
        config.api.base_url = base_url;
    }
    if let Some(timeout) = env_parse("LUTEM_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }
    if let Some(agent) = env_string("LUTEM_API_USER_AGENT") {
        config.api.user_agent = Some(agent);
    }

    if let Some(attempts) = env_parse("LUTEM_RETRY_MAX_ATTEMPTS")? {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = env_parse("LUTEM_RETRY_BASE_DELAY_MS")? {
        config.retry.base_delay_ms = delay;
    }
    if let Some(delay) = env_parse("LUTEM_RETRY_MAX_DELAY_MS")? {
        config.retry.max_delay_ms = delay;
    }

    if let Some(path) = env_string("LUTEM_STATE_PATH") {
        config.storage.state_path = PathBuf::from(path);
    }
    if let Some(namespace) = env_string("LUTEM_STATE_NAMESPACE") {
        config.storage.namespace = namespace;
    }

    if let Some(level) = env_string("LUTEM_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("LUTEM_LOG_JSON", config.logging.json);

    Ok(())
}

/// Non-empty environment variable, if set
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `LutemError::Config` if the variable is set but does not parse.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| LutemError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 10] = [
        "LUTEM_API_BASE_URL",
        "LUTEM_API_TIMEOUT_SECS",
        "LUTEM_API_USER_AGENT",
        "LUTEM_RETRY_MAX_ATTEMPTS",
        "LUTEM_RETRY_BASE_DELAY_MS",
        "LUTEM_RETRY_MAX_DELAY_MS",
        "LUTEM_STATE_PATH",
        "LUTEM_STATE_NAMESPACE",
        "LUTEM_LOG_LEVEL",
        "LUTEM_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (value, expected) in
            [("1", true), ("TRUE", true), ("yes", true), ("on", true), ("0", false), ("off", false)]
        {
            std::env::set_var("TEST_LUTEM_BOOL", value);
            assert_eq!(env_bool("TEST_LUTEM_BOOL", !expected), expected, "value {value}");
        }

        std::env::remove_var("TEST_LUTEM_BOOL");
        assert!(env_bool("TEST_LUTEM_BOOL", true));
        assert!(!env_bool("TEST_LUTEM_BOOL", false));
    }

    #[test]
    fn test_load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("LUTEM_API_BASE_URL", "https://api.lutem.dev");
        std::env::set_var("LUTEM_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("LUTEM_RETRY_BASE_DELAY_MS", "250");
        std::env::set_var("LUTEM_LOG_JSON", "true");

        let result = load_from_env();
        clear_env();

        let config = result.expect("config from env");
        assert_eq!(config.api.base_url, "https://api.lutem.dev");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.retry.max_delay_ms, 10_000);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("LUTEM_API_TIMEOUT_SECS", "not-a-number");
        let result = load_from_env();
        clear_env();

        match result {
            Err(LutemError::Config(msg)) => assert!(msg.contains("LUTEM_API_TIMEOUT_SECS")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_env_rejects_inverted_delays() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("LUTEM_RETRY_BASE_DELAY_MS", "5000");
        std::env::set_var("LUTEM_RETRY_MAX_DELAY_MS", "1000");
        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(LutemError::Config(_))));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[api]
base_url = "https://staging.lutem.dev"
timeout_secs = 10

[retry]
max_attempts = 1
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML");
        assert_eq!(config.api.base_url, "https://staging.lutem.dev");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.base_delay_ms, 1000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/lutem.json")));
        assert!(matches!(result, Err(LutemError::Config(_))));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "api": "#, Path::new("lutem.json"));
        assert!(matches!(result, Err(LutemError::Config(msg)) if msg.contains("JSON")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api: {}", Path::new("lutem.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
