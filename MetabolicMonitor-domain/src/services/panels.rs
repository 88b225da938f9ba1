use crate::entities::insights::{HealthInsights, InsightEntry};

pub const EXPLANATIONS_TITLE: &str = "What does your result indicate";
pub const SUGGESTIONS_TITLE: &str = "How to improve your metabolic health";
pub const NO_EXPLANATIONS: &str = "No explanation available";
pub const NO_SUGGESTIONS: &str = "No suggestions available";

pub const DEFINITION_TITLE: &str = "What is HbA1c";
pub const DEFINITION_TEXT: &str = "HbA1c (glycated haemoglobin) reflects your average blood sugar over the past two to three months. \
Below 5.7% is considered normal, 5.7% to 6.4% indicates prediabetes, and 6.5% or above is in the diabetes range.";

/// What an insight panel shows: its entries, or a placeholder when it has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView<'a> {
    pub title: &'static str,
    pub entries: &'a [InsightEntry],
    pub placeholder: Option<&'static str>,
}

impl<'a> PanelView<'a> {
    fn new(title: &'static str, entries: &'a [InsightEntry], empty: &'static str) -> Self {
        Self {
            title,
            entries,
            placeholder: entries.is_empty().then_some(empty),
        }
    }
}

pub fn explanations_panel(insights: Option<&HealthInsights>) -> PanelView<'_> {
    let entries = insights.map(|i| i.explanations.as_slice()).unwrap_or(&[]);
    PanelView::new(EXPLANATIONS_TITLE, entries, NO_EXPLANATIONS)
}

pub fn suggestions_panel(insights: Option<&HealthInsights>) -> PanelView<'_> {
    let entries = insights.map(|i| i.suggestions.as_slice()).unwrap_or(&[]);
    PanelView::new(SUGGESTIONS_TITLE, entries, NO_SUGGESTIONS)
}
