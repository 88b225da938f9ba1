// Repository module structure
pub mod errors;
mod health_api;
mod in_memory;

// Re-export commonly used types
pub use errors::ApiError;
pub use health_api::{HealthApiTrait, HttpHealthApi};
pub use in_memory::InMemoryHealthApi;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use health_api::tests;
