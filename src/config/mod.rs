use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub oracle: OracleConfig,
    pub discord: DiscordConfig,
    pub snapshot: SnapshotConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Generative-text oracle (Gemini) configuration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Discord REST API configuration
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub base_url: String,
}

/// Graph snapshot configuration
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let oracle = OracleConfig {
            api_key: env::var("GEMINI_API_KEY").map_err(|_| AppError::Config {
                message: "GEMINI_API_KEY is required".to_string(),
            })?,
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.0-flash-001".to_string()),
        };

        let discord = DiscordConfig {
            bot_token: env::var("DISCORD_TOKEN").map_err(|_| AppError::Config {
                message: "DISCORD_TOKEN is required".to_string(),
            })?,
            base_url: env::var("DISCORD_BASE_URL")
                .unwrap_or_else(|_| "https://discord.com/api/v10".to_string()),
        };

        let snapshot = SnapshotConfig {
            path: PathBuf::from(
                env::var("GRAPH_PATH").unwrap_or_else(|_| "./data/discourse_graph.json".to_string()),
            ),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };

        Ok(Config {
            oracle,
            discord,
            snapshot,
            logging,
            request,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}
