//! Client configuration for the Metabolic Health Monitor backend
//!
//! One base URL is shared by the HTTP endpoints and the push-notification
//! connection. Everything is read from environment variables, with defaults
//! suitable for a backend running on the local machine.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};
use validator::Validate;

/// Base URL used when `API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Seconds to wait before reopening a dropped push connection
pub const DEFAULT_RECONNECT_SECONDS: u64 = 5;

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A numeric variable could not be parsed
    #[error("Environment variable {name} is not a valid number: {value}")]
    NotANumber { name: String, value: String },
}

/// Settings shared by the HTTP client and the push listener
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ClientConfig {
    /// Base address of the backend, e.g. `http://localhost:5000`
    #[validate(url(message = "API_URL must be an absolute http(s) URL"))]
    pub base_url: String,

    /// Optional per-request timeout. `None` waits indefinitely.
    pub timeout_seconds: Option<u64>,

    /// Delay between push reconnection attempts
    pub reconnect_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: None,
            reconnect_seconds: DEFAULT_RECONNECT_SECONDS,
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration from environment variables
    ///
    /// - `API_URL` (default `http://localhost:5000`)
    /// - `API_TIMEOUT_SECONDS` (default: no timeout)
    /// - `PUSH_RECONNECT_SECONDS` (default 5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout_seconds = match env::var("API_TIMEOUT_SECONDS") {
            Ok(value) => Some(parse_seconds("API_TIMEOUT_SECONDS", &value)?),
            Err(_) => None,
        };

        let reconnect_seconds = match env::var("PUSH_RECONNECT_SECONDS") {
            Ok(value) => parse_seconds("PUSH_RECONNECT_SECONDS", &value)?,
            Err(_) => DEFAULT_RECONNECT_SECONDS,
        };

        let config = Self {
            base_url,
            timeout_seconds,
            reconnect_seconds,
        }
        .validated()?;

        info!(
            base_url = %config.base_url,
            timeout_seconds = ?config.timeout_seconds,
            reconnect_seconds = config.reconnect_seconds,
            "Client configuration loaded"
        );

        Ok(config)
    }

    /// Replace the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the request timeout
    pub fn with_timeout_seconds(mut self, timeout_seconds: Option<u64>) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Replace the reconnect delay
    pub fn with_reconnect_seconds(mut self, reconnect_seconds: u64) -> Self {
        self.reconnect_seconds = reconnect_seconds;
        self
    }

    /// Run validation and normalise the base URL (no trailing slash)
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if let Err(validation_errors) = self.validate() {
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(ConfigError::Invalid(error_message));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url: unsupported scheme in {}",
                self.base_url
            )));
        }

        if self.reconnect_seconds == 0 {
            warn!("PUSH_RECONNECT_SECONDS is 0, reconnecting without delay");
        }

        self.base_url = self.base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Full URL for an API path such as `/api/readings`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }

    /// Reconnect delay as a `Duration`
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_seconds)
    }
}

fn parse_seconds(name: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::NotANumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}
