//! Config environment variable tests
//!
//! These tests verify that Config::from_env() correctly reads and applies
//! environment variable overrides. Note that Config::from_env() also loads
//! from .env file via dotenvy, so these tests set the required keys first.
//!
//! Tests use #[serial] to prevent race conditions with shared env vars.

use remarker::config::{Config, LogFormat};
use serial_test::serial;
use std::env;

fn set_required_vars() {
    env::set_var("GEMINI_API_KEY", "test-gemini-key");
    env::set_var("DISCORD_TOKEN", "test-discord-token");
}

#[test]
#[serial]
fn test_config_from_env_loads_successfully() {
    set_required_vars();

    let config = Config::from_env().unwrap();
    assert_eq!(config.oracle.api_key, "test-gemini-key");
    assert_eq!(config.discord.bot_token, "test-discord-token");
    assert_eq!(
        config.oracle.base_url,
        "https://generativelanguage.googleapis.com"
    );
    assert_eq!(config.discord.base_url, "https://discord.com/api/v10");
}

#[test]
#[serial]
fn test_config_from_env_missing_api_key_fails() {
    env::remove_var("GEMINI_API_KEY");
    env::set_var("DISCORD_TOKEN", "test-discord-token");

    let result = Config::from_env();
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("GEMINI_API_KEY"));
}

#[test]
#[serial]
fn test_config_from_env_custom_base_urls() {
    set_required_vars();
    env::set_var("GEMINI_BASE_URL", "https://custom.oracle.example");
    env::set_var("DISCORD_BASE_URL", "https://custom.discord.example");

    let config = Config::from_env().unwrap();
    assert_eq!(config.oracle.base_url, "https://custom.oracle.example");
    assert_eq!(config.discord.base_url, "https://custom.discord.example");

    // Restore defaults
    env::remove_var("GEMINI_BASE_URL");
    env::remove_var("DISCORD_BASE_URL");
}

#[test]
#[serial]
fn test_config_from_env_custom_snapshot_path() {
    set_required_vars();
    env::set_var("GRAPH_PATH", "/custom/graph.json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.snapshot.path.to_str().unwrap(), "/custom/graph.json");

    env::remove_var("GRAPH_PATH");
}

#[test]
#[serial]
fn test_config_from_env_json_log_format() {
    set_required_vars();
    env::set_var("LOG_FORMAT", "json");

    let config = Config::from_env().unwrap();
    assert_eq!(config.logging.format, LogFormat::Json);

    env::set_var("LOG_FORMAT", "pretty");
}

#[test]
#[serial]
fn test_config_from_env_custom_request() {
    set_required_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "60000");
    env::set_var("MAX_RETRIES", "5");
    env::set_var("RETRY_DELAY_MS", "2000");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 60000);
    assert_eq!(config.request.max_retries, 5);
    assert_eq!(config.request.retry_delay_ms, 2000);

    // Restore defaults
    env::remove_var("REQUEST_TIMEOUT_MS");
    env::remove_var("MAX_RETRIES");
    env::remove_var("RETRY_DELAY_MS");
}

#[test]
#[serial]
fn test_config_from_env_invalid_numbers_fall_back_to_defaults() {
    set_required_vars();
    env::set_var("REQUEST_TIMEOUT_MS", "not-a-number");

    let config = Config::from_env().unwrap();
    assert_eq!(config.request.timeout_ms, 30000);

    env::remove_var("REQUEST_TIMEOUT_MS");
}
