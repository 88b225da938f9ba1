// Metabolic Monitor Domain
// This crate contains the client-side state owners for the dashboard

// Services that own component state and call the backend
pub mod services;

// Domain entities
pub mod entities;

// Live-update notification hub
pub mod events;

// Re-export the backend client types for convenience
pub use metabolic_monitor_data::{ApiError, ClientConfig, HealthApiTrait};

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
