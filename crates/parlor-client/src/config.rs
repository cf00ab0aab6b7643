//! Client configuration
//!
//! Loads configuration from environment variables, with an optional `.env`
//! file for development.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Client connection configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL, without a trailing slash
    pub api_base_url: String,
    /// Realtime gateway URL
    pub gateway_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_gateway_url() -> String {
    "ws://127.0.0.1:8081".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            gateway_url: default_gateway_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set but not parseable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let request_timeout_secs = match env::var("PARLOR_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ConfigError::InvalidValue("PARLOR_REQUEST_TIMEOUT_SECS", raw.clone())
            })?,
            Err(_) => default_request_timeout_secs(),
        };

        Ok(Self {
            api_base_url: env::var("PARLOR_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| default_api_base_url()),
            gateway_url: env::var("PARLOR_GATEWAY_URL").unwrap_or_else(|_| default_gateway_url()),
            request_timeout_secs,
        })
    }

    /// Build a `reqwest` client honoring the configured request timeout
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
