use std::sync::PoisonError;
use thiserror::Error;

use crate::config::ConfigError;

/// Error type for backend API calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connection refused, reset, timeout)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The response body did not match the expected shape
    #[error("Could not decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Lock error in the in-memory backend
    #[error("Lock error: {0}")]
    Lock(String),
}

impl ApiError {
    /// Whether the failure happened before any response arrived
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    /// Whether the response body was malformed
    pub fn is_decode(&self) -> bool {
        matches!(self, ApiError::Decode { .. })
    }
}

impl<T> From<PoisonError<T>> for ApiError {
    fn from(error: PoisonError<T>) -> Self {
        ApiError::Lock(error.to_string())
    }
}
