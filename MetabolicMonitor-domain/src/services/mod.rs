pub mod chart;
pub mod chat;
pub mod dashboard;
pub mod form;
pub mod insights;
pub mod panels;
pub mod refresh;

// Domain services
// Each state owner is driven by one event loop; async helpers perform the
// backend calls and hand their results back to the owner.

// Re-export the state owners and their async helpers
pub use chart::{load_series, project_series, ChartState};
pub use chat::{clear_history, load_history, load_transcript, send_message, ChatSession, CHAT_APOLOGY};
pub use dashboard::{
    DashboardState, FETCH_ERROR_MESSAGE, NO_DATA_MESSAGE, PROCESSING_ERROR_MESSAGE,
};
pub use form::{submit_reading, FormError, ReadingForm, SubmitPolicy};
pub use insights::{categorize_hba1c, fetch_insights, interpret_insights_response, InsightOutcome};
pub use refresh::{RefreshToken, RefreshTracker};
