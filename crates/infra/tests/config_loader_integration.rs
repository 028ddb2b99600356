//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! turning it into a working client.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use lutem_domain::LutemError;
use lutem_infra::{config, LutemApi, ResilientClient};
use tempfile::NamedTempFile;

fn config_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("lutem-config")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        r#"{
            "api": {"base_url": "https://api.lutem.test", "timeout_secs": 12},
            "retry": {"max_attempts": 5, "base_delay_ms": 250, "max_delay_ms": 4000},
            "storage": {"state_path": "/tmp/lutem-state.json", "namespace": "steam"}
        }"#,
        ".json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.base_url, "https://api.lutem.test");
    assert_eq!(config.api.timeout(), Duration::from_secs(12));
    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.base_delay(), Duration::from_millis(250));
    assert_eq!(config.retry.max_delay(), Duration::from_millis(4000));
    assert_eq!(config.storage.state_path, PathBuf::from("/tmp/lutem-state.json"));
    assert_eq!(config.storage.namespace, "steam");

    // Unspecified sections keep their defaults
    assert_eq!(config.logging.level, "info");
    assert!(!config.logging.json);
}

#[test]
fn test_load_config_from_toml_file() {
    let file = config_file(
        r#"
[api]
base_url = "http://localhost:9090"
user_agent = "lutem-desktop/1.0"

[retry]
max_attempts = 0

[logging]
level = "lutem=debug"
json = true
"#,
        ".toml",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.api.base_url, "http://localhost:9090");
    assert_eq!(config.api.user_agent.as_deref(), Some("lutem-desktop/1.0"));
    assert_eq!(config.retry.max_attempts, 0);
    assert_eq!(config.logging.level, "lutem=debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_with_invalid_toml() {
    let file = config_file("[api\nbase_url = ", ".toml");

    let err = config::load_from_file(Some(file.path().to_path_buf()))
        .expect_err("Invalid TOML should be rejected");

    match err {
        LutemError::Config(message) => assert!(message.contains("Invalid TOML format")),
        other => panic!("Expected config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_wrong_field_type() {
    let file = config_file(r#"{"retry": {"max_attempts": "three"}}"#, ".json");

    let result = config::load_from_file(Some(file.path().to_path_buf()));
    assert!(matches!(result, Err(LutemError::Config(_))));
}

#[test]
fn test_loaded_config_builds_client() {
    let file = config_file(
        r#"{"api": {"base_url": "http://127.0.0.1:8080/"}, "retry": {"max_attempts": 2}}"#,
        ".json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("load");
    let client = ResilientClient::from_config(&config).expect("client should build");

    assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    assert_eq!(client.retry_policy().max_attempts, 2);
    assert!(LutemApi::from_config(&config).is_ok());
}

#[test]
fn test_inverted_delays_do_not_build_client() {
    let file = config_file(
        r#"{"retry": {"base_delay_ms": 5000, "max_delay_ms": 100}}"#,
        ".json",
    );

    let config = config::load_from_file(Some(file.path().to_path_buf())).expect("load");
    let result = ResilientClient::from_config(&config);

    assert!(matches!(result, Err(LutemError::Config(_))));
}
