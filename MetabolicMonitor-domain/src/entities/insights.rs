use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// JSON key of the explanations list
pub const EXPLANATIONS_KEY: &str = "Explanations";

/// JSON key of the suggestions list
pub const SUGGESTIONS_KEY: &str = "Suggestions";

/// One heading/body pair of an insight panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEntry {
    pub label: String,
    pub text: String,
}

impl InsightEntry {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Generated explanations and suggestions for the current readings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInsights {
    pub explanations: Vec<InsightEntry>,
    pub suggestions: Vec<InsightEntry>,
}

/// Why an insight document was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsightError {
    #[error("Insight payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Insight payload must be a JSON object")]
    NotAnObject,

    #[error("{list} must be an array")]
    NotAList { list: &'static str },

    #[error("{list}[{index}] {reason}")]
    MalformedEntry {
        list: &'static str,
        index: usize,
        reason: &'static str,
    },
}

impl HealthInsights {
    /// Parse the JSON text of a generated insight document
    ///
    /// A missing list is treated as empty. Every entry must be an object
    /// holding exactly one string-valued pair; anything else rejects the
    /// whole document.
    pub fn parse(text: &str) -> Result<Self, InsightError> {
        let document: Value =
            serde_json::from_str(text).map_err(|e| InsightError::InvalidJson(e.to_string()))?;
        let object = document.as_object().ok_or(InsightError::NotAnObject)?;

        Ok(Self {
            explanations: parse_list(object, EXPLANATIONS_KEY)?,
            suggestions: parse_list(object, SUGGESTIONS_KEY)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.explanations.is_empty() && self.suggestions.is_empty()
    }
}

fn parse_list(
    object: &Map<String, Value>,
    list: &'static str,
) -> Result<Vec<InsightEntry>, InsightError> {
    let items = match object.get(list) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(InsightError::NotAList { list }),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_entry(item).map_err(|reason| InsightError::MalformedEntry {
            list,
            index,
            reason,
        }))
        .collect()
}

fn parse_entry(item: &Value) -> Result<InsightEntry, &'static str> {
    let pairs = item.as_object().ok_or("is not an object")?;
    let mut iter = pairs.iter();
    match (iter.next(), iter.next()) {
        (Some((label, Value::String(text))), None) => Ok(InsightEntry::new(label.clone(), text.clone())),
        (Some(_), None) => Err("has a non-string value"),
        (None, _) => Err("is empty"),
        (Some(_), Some(_)) => Err("has more than one pair"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_in_order() {
        let text = r#"{
            "Explanations": [{"HbA1c": "Your value is normal."}, {"Trend": "Stable."}],
            "Suggestions": [{"Diet": "Eat more fibre."}]
        }"#;
        let insights = HealthInsights::parse(text).unwrap();

        assert_eq!(
            insights.explanations,
            vec![
                InsightEntry::new("HbA1c", "Your value is normal."),
                InsightEntry::new("Trend", "Stable."),
            ]
        );
        assert_eq!(insights.suggestions, vec![InsightEntry::new("Diet", "Eat more fibre.")]);
    }

    #[test]
    fn test_parse_empty_lists() {
        let insights = HealthInsights::parse(r#"{"Explanations":[],"Suggestions":[]}"#).unwrap();
        assert!(insights.explanations.is_empty());
        assert!(insights.suggestions.is_empty());
        assert!(insights.is_empty());
    }

    #[test]
    fn test_missing_list_is_empty() {
        let insights = HealthInsights::parse(r#"{"Suggestions":[{"Walk":"Daily."}]}"#).unwrap();
        assert!(insights.explanations.is_empty());
        assert_eq!(insights.suggestions.len(), 1);
    }

    #[test]
    fn test_entry_with_two_pairs_is_rejected() {
        let result = HealthInsights::parse(r#"{"Explanations":[{"a":"x","b":"y"}]}"#);
        assert_eq!(
            result,
            Err(InsightError::MalformedEntry {
                list: EXPLANATIONS_KEY,
                index: 0,
                reason: "has more than one pair",
            })
        );
    }

    #[test]
    fn test_non_string_and_empty_entries_are_rejected() {
        assert!(matches!(
            HealthInsights::parse(r#"{"Suggestions":[{"a":"x"},{"b":3}]}"#),
            Err(InsightError::MalformedEntry { index: 1, .. })
        ));
        assert!(matches!(
            HealthInsights::parse(r#"{"Suggestions":[{}]}"#),
            Err(InsightError::MalformedEntry { .. })
        ));
        assert!(matches!(
            HealthInsights::parse(r#"{"Suggestions":["plain"]}"#),
            Err(InsightError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn test_non_object_documents_are_rejected() {
        assert!(matches!(HealthInsights::parse("not json"), Err(InsightError::InvalidJson(_))));
        assert_eq!(HealthInsights::parse("[]"), Err(InsightError::NotAnObject));
        assert_eq!(
            HealthInsights::parse(r#"{"Explanations":"text"}"#),
            Err(InsightError::NotAList { list: EXPLANATIONS_KEY })
        );
    }
}
