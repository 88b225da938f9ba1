//! Live-update notifications
//!
//! The backend announces changes to the reading history over Socket.IO.
//! This module speaks the Engine.IO v4 long-polling transport directly with
//! reqwest and forwards every received event as a [`PushEvent`].

mod listener;
pub mod packet;

use serde_json::Value;
use thiserror::Error;

pub use listener::SocketIoListener;

/// Event emitted by the backend after the reading history changed
pub const NEW_READING_EVENT: &str = "new_reading";

/// A Socket.IO event received from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct PushEvent {
    /// Event name, e.g. `new_reading`
    pub name: String,

    /// Event arguments; `new_reading` carries none
    pub args: Vec<Value>,
}

impl PushEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Whether this event signals that readings changed
    pub fn is_new_reading(&self) -> bool {
        self.name == NEW_READING_EVENT
    }
}

/// Push connection errors
#[derive(Error, Debug)]
pub enum PushError {
    /// HTTP request to the polling endpoint failed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Polling endpoint returned a non-success status
    #[error("Polling endpoint returned HTTP {0}")]
    Status(u16),

    /// A packet could not be decoded
    #[error("Malformed packet: {0}")]
    Protocol(String),

    /// The server refused the namespace connection
    #[error("Connection rejected: {0}")]
    Rejected(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
