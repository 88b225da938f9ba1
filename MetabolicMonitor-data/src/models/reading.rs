use std::collections::BTreeMap;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Response of `GET /api/readings`: stored values keyed by date string
///
/// Keys are unique, so a date that appears twice in the JSON keeps the last
/// value seen.
pub type ReadingsResponse = BTreeMap<String, ReadingValues>;

/// Biomarker values stored for one date
///
/// Field names follow the backend's JSON keys. Every value is nullable; the
/// backend has stored numbers both as JSON numbers and as numeric strings, so
/// decoding accepts either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingValues {
    /// High-sensitivity C-reactive protein (mg/L)
    #[serde(rename = "hsCRP", default, deserialize_with = "lenient_f64")]
    pub hs_crp: Option<f64>,

    /// Glycated haemoglobin (%)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hba1c: Option<f64>,

    /// Fasting glucose (mmol/L)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fasting_glucose: Option<f64>,

    /// LDL cholesterol (mmol/L)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ldl_cholesterol: Option<f64>,

    /// Triglycerides (mmol/L)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub triglycerides: Option<f64>,

    /// HDL cholesterol (mmol/L)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub hdl_cholesterol: Option<f64>,

    /// Alanine aminotransferase (U/L)
    #[serde(rename = "ALT_liver_enzymes", default, deserialize_with = "lenient_f64")]
    pub alt_liver_enzymes: Option<f64>,

    /// Triglyceride / HDL ratio as computed by the client that stored it
    #[serde(default, deserialize_with = "lenient_f64")]
    pub triglyceride_hdl_ratio: Option<f64>,
}

/// Request body of `POST /api/addReading`
///
/// All eight value keys are always present (as `null` when absent); the
/// backend indexes them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Date in `YYYY-MM-DD` form; identity of the reading
    pub date: String,

    #[serde(flatten)]
    pub values: ReadingValues,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64().filter(|n| n.is_finite())),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(number) if number.is_finite() => Ok(Some(number)),
                _ => {
                    warn!(value = %text, "Ignoring non-numeric biomarker value");
                    Ok(None)
                }
            }
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected a number or numeric string, got {}",
            other
        ))),
    }
}
