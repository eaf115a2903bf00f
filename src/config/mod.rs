use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub relay: RelayConfig,
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Local durable store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

/// Call-intake relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub base_url: String,
}

/// Claim-assistant service configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub base_url: String,
    pub api_key: Option<String>,
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

/// HTTP request configuration shared by the relay and assistant clients
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = StoreConfig {
            path: PathBuf::from(
                env::var("REX_STORE_PATH").unwrap_or_else(|_| "./data/rex-store.json".to_string()),
            ),
        };

        let relay = RelayConfig {
            base_url: env::var("REX_CALLS_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8788".to_string()),
        };

        let assistant = AssistantConfig {
            base_url: env::var("REX_ASSISTANT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8787".to_string()),
            api_key: env::var("REX_ASSISTANT_API_KEY").ok(),
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
        };

        Ok(Config {
            store,
            relay,
            assistant,
            logging,
            request,
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self { timeout_ms: 30000 }
    }
}
