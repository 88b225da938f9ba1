use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format for chart labels, e.g. "Jan 5, 2024"
pub const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y";

/// Padding added above and below the data when the value axis auto-fits
pub const VALUE_AXIS_PADDING: f64 = 1.0;

/// One plotted HbA1c value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub label: String,
}

impl ChartPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            value,
            label: date.format(DISPLAY_DATE_FORMAT).to_string(),
        }
    }

    /// Band this value falls in
    pub fn status(&self) -> HealthStatus {
        HealthStatus::classify(self.value)
    }
}

/// HbA1c classification shown above the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HealthStatus {
    #[default]
    NoData,
    Normal,
    Elevated,
    High,
}

impl HealthStatus {
    /// Classify an HbA1c percentage
    pub fn classify(value: f64) -> Self {
        if value < 5.7 {
            HealthStatus::Normal
        } else if value < 6.5 {
            HealthStatus::Elevated
        } else {
            HealthStatus::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::NoData => "NO DATA",
            HealthStatus::Normal => "NORMAL",
            HealthStatus::Elevated => "ELEVATED",
            HealthStatus::High => "HIGH",
        }
    }

    /// Short explanation of the band
    pub fn description(&self) -> &'static str {
        match self {
            HealthStatus::NoData => "Add a reading to see your status",
            HealthStatus::Normal => "Below 5.7%",
            HealthStatus::Elevated => "5.7% to 6.4%",
            HealthStatus::High => "6.5% or above",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Horizontal bound of the view window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainBound {
    /// Follow the first or last point of the series
    #[default]
    Auto,
    Date(NaiveDate),
}

/// Vertical bound of the view window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ValueBound {
    /// Data extreme padded by [`VALUE_AXIS_PADDING`]
    #[default]
    Auto,
    Value(f64),
}

/// Committed view window; the default is the full range
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomWindow {
    pub left: DomainBound,
    pub right: DomainBound,
    pub bottom: ValueBound,
    pub top: ValueBound,
}

impl ZoomWindow {
    pub const FULL_RANGE: ZoomWindow = ZoomWindow {
        left: DomainBound::Auto,
        right: DomainBound::Auto,
        bottom: ValueBound::Auto,
        top: ValueBound::Auto,
    };

    pub fn is_full_range(&self) -> bool {
        *self == Self::FULL_RANGE
    }
}

/// Drag selection in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub left: Option<NaiveDate>,
    pub right: Option<NaiveDate>,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.left.is_some()
    }
}
