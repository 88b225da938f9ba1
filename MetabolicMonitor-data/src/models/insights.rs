use serde::{Deserialize, Serialize};

/// Text the backend returns in `response_text` when it holds no readings
pub const NO_DATA_SENTINEL: &str = "No data found.";

/// Response of `POST /api/generate_insights`
///
/// `response_text` is either [`NO_DATA_SENTINEL`] or a JSON document with
/// `Explanations` and `Suggestions` arrays. Decoding that document is the
/// domain layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    pub response_text: String,
}

impl InsightsResponse {
    /// Whether the backend reported that it has nothing to analyse
    pub fn is_no_data(&self) -> bool {
        self.response_text.trim() == NO_DATA_SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        let response: InsightsResponse =
            serde_json::from_str(r#"{"response_text": "No data found."}"#).unwrap();
        assert!(response.is_no_data());

        let response = InsightsResponse {
            response_text: r#"{"Explanations":[],"Suggestions":[]}"#.to_string(),
        };
        assert!(!response.is_no_data());
    }
}
