// Metabolic Monitor Data
// This crate handles every interaction with the backend service

// Client configuration loaded from the environment
pub mod config;

// HTTP access to readings, insights and chat
pub mod repository;

// Wire models exchanged with the backend
pub mod models;

// Live-update notifications over Socket.IO
pub mod push;

pub use config::{ClientConfig, ConfigError};
pub use repository::{ApiError, HealthApiTrait, HttpHealthApi, InMemoryHealthApi};
pub use push::{PushError, PushEvent, SocketIoListener, NEW_READING_EVENT};
