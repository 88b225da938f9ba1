use tracing::{debug, info};

use crate::entities::insights::HealthInsights;
use crate::services::insights::InsightOutcome;
use crate::services::refresh::{RefreshToken, RefreshTracker};

pub const NO_DATA_MESSAGE: &str = "No data available.";
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing data.";
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching data.";

/// Top-level dashboard state
///
/// Owns the latest insights, the message shown in their place, and the
/// "cleared" flag that keeps a just-cleared session from fetching insights
/// again until a reading is added or a live update arrives.
#[derive(Debug)]
pub struct DashboardState {
    insights: Option<HealthInsights>,
    message: Option<String>,
    loading: bool,
    cleared: bool,
    show_chat: bool,
    refresh: RefreshTracker,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            insights: None,
            message: None,
            loading: false,
            cleared: false,
            show_chat: true,
            refresh: RefreshTracker::new(),
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insights(&self) -> Option<&HealthInsights> {
        self.insights.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Whether insights should be fetched without an explicit trigger
    pub fn should_auto_fetch(&self) -> bool {
        !self.cleared
    }

    pub fn shows_chart(&self) -> bool {
        !self.cleared
    }

    pub fn shows_panels(&self) -> bool {
        self.insights.is_some() && !self.cleared && !self.loading
    }

    pub fn shows_chat(&self) -> bool {
        self.insights.is_some() && self.show_chat
    }

    /// Start an insight fetch; only the returned token's outcome is applied
    pub fn begin_insight_fetch(&mut self) -> RefreshToken {
        self.loading = true;
        self.refresh.issue()
    }

    /// Apply an insight outcome; returns `false` if it was superseded
    pub fn apply_insights(&mut self, token: RefreshToken, outcome: InsightOutcome) -> bool {
        if !self.refresh.is_current(token) {
            debug!(token = token.value(), "Discarding stale insights");
            return false;
        }

        self.loading = false;
        match outcome {
            InsightOutcome::NoData => {
                self.insights = None;
                self.message = Some(NO_DATA_MESSAGE.to_string());
            }
            InsightOutcome::Loaded(insights) => {
                self.insights = Some(insights);
                self.message = None;
            }
            InsightOutcome::Malformed(_) => {
                self.insights = None;
                self.message = Some(PROCESSING_ERROR_MESSAGE.to_string());
            }
            InsightOutcome::Unavailable(_) => {
                self.message = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        true
    }

    /// A live update arrived; the caller fetches insights next
    pub fn on_readings_changed(&mut self) {
        self.cleared = false;
        self.show_chat = true;
    }

    /// A reading was added from this dashboard; the caller fetches insights next
    pub fn on_reading_added(&mut self) {
        self.cleared = false;
    }

    /// Apply a successful bulk delete
    ///
    /// Outstanding insight fetches are superseded so they cannot bring the
    /// cleared insights back.
    pub fn clear_session(&mut self) {
        self.insights = None;
        self.message = Some(NO_DATA_MESSAGE.to_string());
        self.loading = false;
        self.cleared = true;
        self.show_chat = false;
        self.refresh.invalidate();
        info!("Session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::insights::{InsightEntry, InsightError};
    use metabolic_monitor_data::repository::tests::unavailable;

    fn loaded() -> InsightOutcome {
        InsightOutcome::Loaded(HealthInsights {
            explanations: vec![InsightEntry::new("HbA1c", "Normal")],
            suggestions: vec![],
        })
    }

    fn with_insights() -> DashboardState {
        let mut state = DashboardState::new();
        let token = state.begin_insight_fetch();
        state.apply_insights(token, loaded());
        state
    }

    #[test]
    fn test_initial_state() {
        let state = DashboardState::new();
        assert!(state.should_auto_fetch());
        assert!(state.insights().is_none());
        assert!(state.message().is_none());
        assert!(!state.shows_chat());
    }

    #[test]
    fn test_no_data_outcome() {
        let mut state = with_insights();
        let token = state.begin_insight_fetch();
        state.apply_insights(token, InsightOutcome::NoData);

        assert!(state.insights().is_none());
        assert_eq!(state.message(), Some(NO_DATA_MESSAGE));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_loaded_outcome_clears_message() {
        let mut state = DashboardState::new();
        let token = state.begin_insight_fetch();
        state.apply_insights(token, InsightOutcome::NoData);
        let token = state.begin_insight_fetch();
        state.apply_insights(token, InsightOutcome::Loaded(HealthInsights::default()));

        let insights = state.insights().unwrap();
        assert!(insights.explanations.is_empty());
        assert!(insights.suggestions.is_empty());
        assert_eq!(state.message(), None);
        assert!(state.shows_panels());
        assert!(state.shows_chat());
    }

    #[test]
    fn test_malformed_and_unavailable_outcomes() {
        let mut state = with_insights();
        let token = state.begin_insight_fetch();
        state.apply_insights(token, InsightOutcome::Malformed(InsightError::NotAnObject));
        assert!(state.insights().is_none());
        assert_eq!(state.message(), Some(PROCESSING_ERROR_MESSAGE));

        let token = state.begin_insight_fetch();
        state.apply_insights(token, InsightOutcome::Unavailable(unavailable("POST /api/generate_insights")));
        assert_eq!(state.message(), Some(FETCH_ERROR_MESSAGE));
    }

    #[test]
    fn test_clear_session_suppresses_auto_fetch() {
        let mut state = with_insights();
        state.clear_session();

        assert!(state.insights().is_none());
        assert_eq!(state.message(), Some(NO_DATA_MESSAGE));
        assert!(!state.should_auto_fetch());
        assert!(!state.shows_chat());
        assert!(!state.shows_chart());

        state.on_reading_added();
        assert!(state.should_auto_fetch());
    }

    #[test]
    fn test_notification_lifts_suppression_and_shows_chat() {
        let mut state = with_insights();
        state.clear_session();
        state.on_readings_changed();

        assert!(state.should_auto_fetch());
        let token = state.begin_insight_fetch();
        state.apply_insights(token, loaded());
        assert!(state.shows_chat());
    }

    #[test]
    fn test_fetch_in_flight_during_clear_is_dropped() {
        let mut state = DashboardState::new();
        let token = state.begin_insight_fetch();
        state.clear_session();

        assert!(!state.apply_insights(token, loaded()));
        assert!(state.insights().is_none());
    }
}
