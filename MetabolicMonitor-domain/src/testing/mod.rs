// Testing utilities and fixtures for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use metabolic_monitor_data::repository::tests::{
    sample_conversation, sample_readings, unavailable, MockHealthApi,
};
pub use metabolic_monitor_data::InMemoryHealthApi;

use chrono::NaiveDate;
use metabolic_monitor_data::models::{InsightsResponse, ReadingRecord, ReadingValues};
use serde_json::{json, Map, Value};

use crate::entities::chart::ChartPoint;
use crate::entities::insights::{HealthInsights, InsightEntry};

/// A stored reading with only an HbA1c value
pub fn hba1c_record(date: &str, hba1c: f64) -> ReadingRecord {
    ReadingRecord {
        date: date.to_string(),
        values: ReadingValues {
            hba1c: Some(hba1c),
            ..Default::default()
        },
    }
}

/// In-memory backend seeded with HbA1c readings
pub fn seeded_backend(readings: &[(&str, f64)]) -> InMemoryHealthApi {
    readings
        .iter()
        .fold(InMemoryHealthApi::new(), |api, (date, value)| {
            api.with_reading(hba1c_record(date, *value))
        })
}

/// Chart series for `(year, month, day, value)` tuples, already sorted
pub fn series(points: &[(i32, u32, u32, f64)]) -> Vec<ChartPoint> {
    points
        .iter()
        .filter_map(|(y, m, d, v)| NaiveDate::from_ymd_opt(*y, *m, *d).map(|date| ChartPoint::new(date, *v)))
        .collect()
}

/// Insights with one explanation and one suggestion
pub fn sample_insights() -> HealthInsights {
    HealthInsights {
        explanations: vec![InsightEntry::new("HbA1c", "Your latest value is in the normal range.")],
        suggestions: vec![InsightEntry::new("Exercise", "Aim for 150 minutes of activity a week.")],
    }
}

/// `generate_insights` response carrying `insights` as JSON text
pub fn insights_response(insights: &HealthInsights) -> InsightsResponse {
    let list = |entries: &[InsightEntry]| {
        entries
            .iter()
            .map(|entry| {
                let mut pair = Map::new();
                pair.insert(entry.label.clone(), Value::String(entry.text.clone()));
                Value::Object(pair)
            })
            .collect::<Vec<_>>()
    };
    InsightsResponse {
        response_text: json!({
            "Explanations": list(&insights.explanations),
            "Suggestions": list(&insights.suggestions),
        })
        .to_string(),
    }
}
