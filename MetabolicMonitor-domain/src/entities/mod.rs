pub mod chart;
pub mod chat;
pub mod conversions;
pub mod insights;
pub mod reading;

// Re-export common types for easier imports
pub use chart::{ChartPoint, DomainBound, HealthStatus, Selection, ValueBound, ZoomWindow};
pub use chat::{markup_segments, ChatMessage, ChatRole, TextSegment};
pub use insights::{HealthInsights, InsightEntry, InsightError};
pub use reading::{triglyceride_hdl_ratio, Biomarker, BiomarkerValues, Reading};
