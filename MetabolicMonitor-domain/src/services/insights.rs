use metabolic_monitor_data::models::InsightsResponse;
use metabolic_monitor_data::{ApiError, HealthApiTrait};
use tracing::{info, warn};

use crate::entities::chart::HealthStatus;
use crate::entities::insights::{HealthInsights, InsightError};

/// Categorize the latest HbA1c value; no value means no data
pub fn categorize_hba1c(latest: Option<f64>) -> HealthStatus {
    latest.map_or(HealthStatus::NoData, HealthStatus::classify)
}

/// Result of asking the backend for generated insights
#[derive(Debug)]
pub enum InsightOutcome {
    /// The backend has no readings to describe
    NoData,
    Loaded(HealthInsights),
    /// The payload could not be parsed
    Malformed(InsightError),
    /// Transport failure or error status
    Unavailable(ApiError),
}

/// Interpret a successful `generate_insights` response
pub fn interpret_insights_response(response: &InsightsResponse) -> InsightOutcome {
    if response.is_no_data() {
        return InsightOutcome::NoData;
    }
    match HealthInsights::parse(&response.response_text) {
        Ok(insights) => InsightOutcome::Loaded(insights),
        Err(e) => InsightOutcome::Malformed(e),
    }
}

/// Request freshly generated insights
pub async fn fetch_insights(api: &dyn HealthApiTrait) -> InsightOutcome {
    match api.generate_insights().await {
        Ok(response) => {
            let outcome = interpret_insights_response(&response);
            match &outcome {
                InsightOutcome::Loaded(insights) => info!(
                    explanations = insights.explanations.len(),
                    suggestions = insights.suggestions.len(),
                    "Insights loaded"
                ),
                InsightOutcome::Malformed(e) => warn!(error = %e, "Rejected insight payload"),
                _ => info!("No readings to generate insights from"),
            }
            outcome
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch insights");
            InsightOutcome::Unavailable(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabolic_monitor_data::repository::tests::{unavailable, MockHealthApi};

    fn response(text: &str) -> InsightsResponse {
        InsightsResponse {
            response_text: text.to_string(),
        }
    }

    #[test]
    fn test_categorize_hba1c() {
        assert_eq!(categorize_hba1c(None), HealthStatus::NoData);
        assert_eq!(categorize_hba1c(Some(5.0)), HealthStatus::Normal);
        assert_eq!(categorize_hba1c(Some(6.0)), HealthStatus::Elevated);
        assert_eq!(categorize_hba1c(Some(7.2)), HealthStatus::High);
    }

    #[test]
    fn test_sentinel_means_no_data() {
        assert!(matches!(
            interpret_insights_response(&response("No data found.")),
            InsightOutcome::NoData
        ));
    }

    #[test]
    fn test_empty_lists_are_loaded() {
        match interpret_insights_response(&response(r#"{"Explanations":[],"Suggestions":[]}"#)) {
            InsightOutcome::Loaded(insights) => assert!(insights.is_empty()),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            interpret_insights_response(&response("I could not generate insights")),
            InsightOutcome::Malformed(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_unavailable() {
        let mut api = MockHealthApi::new();
        api.expect_generate_insights()
            .times(1)
            .returning(|| Err(unavailable("POST /api/generate_insights")));

        assert!(matches!(fetch_insights(&api).await, InsightOutcome::Unavailable(_)));
    }
}
