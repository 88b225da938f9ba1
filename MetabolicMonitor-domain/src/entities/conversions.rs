use chrono::{DateTime, NaiveDate};
use metabolic_monitor_data::models::{ChatMessageRecord, ReadingRecord, ReadingValues, ReadingsResponse};
use tracing::warn;

use crate::entities::chat::{ChatMessage, ChatRole};
use crate::entities::reading::{BiomarkerValues, Reading};

// Conversion functions between domain entities and data models
// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Wire date format of a reading
pub const READING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a reading's date key
///
/// Accepts `YYYY-MM-DD` and, for rows written by other clients, a full
/// RFC 3339 timestamp.
pub fn parse_reading_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, READING_DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.date_naive()))
}

/// Convert from data model to domain entity for one stored reading
///
/// The stored ratio is not trusted; it is derived again from the sources.
pub fn convert_to_domain_reading(date: String, values: ReadingValues) -> Reading {
    Reading {
        date,
        values: BiomarkerValues {
            hs_crp: values.hs_crp,
            hba1c: values.hba1c,
            fasting_glucose: values.fasting_glucose,
            ldl_cholesterol: values.ldl_cholesterol,
            triglycerides: values.triglycerides,
            hdl_cholesterol: values.hdl_cholesterol,
            alt_liver_enzymes: values.alt_liver_enzymes,
        },
    }
}

/// Convert the whole readings map, in date-key order
pub fn convert_to_domain_readings(readings: ReadingsResponse) -> Vec<Reading> {
    readings
        .into_iter()
        .map(|(date, values)| convert_to_domain_reading(date, values))
        .collect()
}

/// Convert from domain entity to the `addReading` request body
pub fn convert_to_data_record(reading: &Reading) -> ReadingRecord {
    let values = &reading.values;
    ReadingRecord {
        date: reading.date.clone(),
        values: ReadingValues {
            hs_crp: values.hs_crp,
            hba1c: values.hba1c,
            fasting_glucose: values.fasting_glucose,
            ldl_cholesterol: values.ldl_cholesterol,
            triglycerides: values.triglycerides,
            hdl_cholesterol: values.hdl_cholesterol,
            alt_liver_enzymes: values.alt_liver_enzymes,
            triglyceride_hdl_ratio: reading.triglyceride_hdl_ratio(),
        },
    }
}

/// Convert a stored chat message; unknown roles are dropped
pub fn convert_to_domain_message(record: ChatMessageRecord) -> Option<ChatMessage> {
    match record.role.parse::<ChatRole>() {
        Ok(role) => Some(ChatMessage {
            role,
            content: record.content,
        }),
        Err(e) => {
            warn!(error = %e, "Skipping chat message");
            None
        }
    }
}

/// Convert a stored transcript, preserving order
pub fn convert_to_domain_transcript(records: Vec<ChatMessageRecord>) -> Vec<ChatMessage> {
    records
        .into_iter()
        .filter_map(convert_to_domain_message)
        .collect()
}
