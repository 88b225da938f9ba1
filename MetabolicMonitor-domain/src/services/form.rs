use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use metabolic_monitor_data::models::Acknowledgement;
use metabolic_monitor_data::{ApiError, HealthApiTrait};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::entities::conversions::{convert_to_data_record, READING_DATE_FORMAT};
use crate::entities::reading::{triglyceride_hdl_ratio, Biomarker, BiomarkerValues, Reading};

/// When the form resets relative to persisting a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubmitPolicy {
    /// Reset once the backend acknowledged the reading
    #[default]
    AwaitPersistence,
    /// Reset immediately; a failed save is only logged
    FireAndForget,
}

impl FromStr for SubmitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await" => Ok(SubmitPolicy::AwaitPersistence),
            "fire-and-forget" | "fire_and_forget" => Ok(SubmitPolicy::FireAndForget),
            other => Err(format!(
                "Unknown submit mode '{}', expected 'await' or 'fire-and-forget'",
                other
            )),
        }
    }
}

impl fmt::Display for SubmitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitPolicy::AwaitPersistence => write!(f, "await"),
            SubmitPolicy::FireAndForget => write!(f, "fire-and-forget"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("A date is required")]
    MissingDate,

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("A reading is already being saved")]
    SubmissionPending,
}

/// Reading entry form
///
/// Each biomarker keeps the raw text typed by the user; its value is the
/// parsed number, or absent for blank or non-numeric text.
#[derive(Debug, Clone)]
pub struct ReadingForm {
    date: String,
    inputs: BTreeMap<Biomarker, String>,
    submitting: bool,
}

impl ReadingForm {
    /// Empty form dated `today`
    pub fn new(today: NaiveDate) -> Self {
        Self {
            date: today.format(READING_DATE_FORMAT).to_string(),
            inputs: BTreeMap::new(),
            submitting: false,
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    /// Raw text of a biomarker input
    pub fn text(&self, biomarker: Biomarker) -> &str {
        self.inputs.get(&biomarker).map(String::as_str).unwrap_or("")
    }

    pub fn set_text(&mut self, biomarker: Biomarker, text: impl Into<String>) {
        self.inputs.insert(biomarker, text.into());
    }

    /// Parsed value of a biomarker input
    pub fn value(&self, biomarker: Biomarker) -> Option<f64> {
        parse_value(self.text(biomarker))
    }

    pub fn values(&self) -> BiomarkerValues {
        let mut values = BiomarkerValues::default();
        for biomarker in Biomarker::ALL {
            values.set(biomarker, self.value(biomarker));
        }
        values
    }

    /// Derived ratio for the current inputs
    pub fn ratio(&self) -> Option<f64> {
        triglyceride_hdl_ratio(
            self.value(Biomarker::Triglycerides),
            self.value(Biomarker::HdlCholesterol),
        )
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.date.trim().is_empty()
    }

    /// Build the completed reading
    pub fn build(&self) -> Result<Reading, FormError> {
        let date = self.date.trim();
        if date.is_empty() {
            return Err(FormError::MissingDate);
        }
        let parsed = NaiveDate::parse_from_str(date, READING_DATE_FORMAT)
            .map_err(|_| FormError::InvalidDate(date.to_string()))?;

        Ok(Reading::new(
            parsed.format(READING_DATE_FORMAT).to_string(),
            self.values(),
        ))
    }

    /// Take the reading for submission
    ///
    /// Under [`SubmitPolicy::FireAndForget`] the form resets right away;
    /// otherwise it stays filled and locked until [`Self::finish_submit`].
    pub fn begin_submit(&mut self, policy: SubmitPolicy, today: NaiveDate) -> Result<Reading, FormError> {
        if self.submitting {
            return Err(FormError::SubmissionPending);
        }
        let reading = self.build()?;
        match policy {
            SubmitPolicy::FireAndForget => self.reset(today),
            SubmitPolicy::AwaitPersistence => self.submitting = true,
        }
        Ok(reading)
    }

    /// Record the save outcome for a submission under [`SubmitPolicy::AwaitPersistence`]
    ///
    /// Resets the form on success; keeps the inputs for another try on failure.
    pub fn finish_submit(&mut self, saved: bool, today: NaiveDate) {
        self.submitting = false;
        if saved {
            self.reset(today);
        }
    }

    /// Clear every input and date the form `today`
    ///
    /// A submission still awaiting its save stays pending.
    pub fn reset(&mut self, today: NaiveDate) {
        let submitting = self.submitting;
        *self = Self::new(today);
        self.submitting = submitting;
    }
}

fn parse_value(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Persist a reading through the backend
#[instrument(skip(api, reading), fields(date = %reading.date))]
pub async fn submit_reading(api: &dyn HealthApiTrait, reading: &Reading) -> Result<Acknowledgement, ApiError> {
    let ack = api.add_reading(convert_to_data_record(reading)).await?;
    info!(message = ?ack.message, "Reading saved");
    Ok(ack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metabolic_monitor_data::repository::tests::MockHealthApi;
    use mockall::predicate::function;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_new_form_is_dated_today() {
        let form = ReadingForm::new(today());
        assert_eq!(form.date(), "2024-06-01");
        assert!(form.can_submit());
        assert_eq!(form.values(), BiomarkerValues::default());
    }

    #[test]
    fn test_blank_and_non_numeric_inputs_are_absent() {
        let mut form = ReadingForm::new(today());
        form.set_text(Biomarker::Hba1c, "  ");
        form.set_text(Biomarker::HsCrp, "abc");
        form.set_text(Biomarker::FastingGlucose, " 5.2 ");

        assert_eq!(form.value(Biomarker::Hba1c), None);
        assert_eq!(form.value(Biomarker::HsCrp), None);
        assert_eq!(form.value(Biomarker::FastingGlucose), Some(5.2));
        assert_eq!(form.text(Biomarker::HsCrp), "abc");
    }

    #[test]
    fn test_ratio_tracks_inputs() {
        let mut form = ReadingForm::new(today());
        assert_eq!(form.ratio(), None);
        form.set_text(Biomarker::Triglycerides, "1.5");
        form.set_text(Biomarker::HdlCholesterol, "1.0");
        assert_eq!(form.ratio(), Some(1.5));
        form.set_text(Biomarker::HdlCholesterol, "0");
        assert_eq!(form.ratio(), None);
    }

    #[test]
    fn test_empty_date_blocks_submission() {
        let mut form = ReadingForm::new(today());
        form.set_date("");
        assert!(!form.can_submit());
        assert_eq!(
            form.begin_submit(SubmitPolicy::FireAndForget, today()),
            Err(FormError::MissingDate)
        );
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let mut form = ReadingForm::new(today());
        form.set_date("2024-13-40");
        assert_eq!(form.build(), Err(FormError::InvalidDate("2024-13-40".to_string())));
    }

    #[test]
    fn test_reset_keeps_pending_submission_locked() {
        let mut form = ReadingForm::new(today());
        form.set_text(Biomarker::Hba1c, "6.1");
        form.begin_submit(SubmitPolicy::AwaitPersistence, today()).unwrap();

        form.reset(today());

        assert!(form.is_submitting());
        assert_eq!(form.text(Biomarker::Hba1c), "");
        assert_eq!(
            form.begin_submit(SubmitPolicy::AwaitPersistence, today()),
            Err(FormError::SubmissionPending)
        );
    }

    #[test]
    fn test_fire_and_forget_resets_immediately() {
        let mut form = ReadingForm::new(today());
        form.set_date("2024-05-20");
        form.set_text(Biomarker::Hba1c, "5.9");

        let reading = form.begin_submit(SubmitPolicy::FireAndForget, today()).unwrap();

        assert_eq!(reading.date, "2024-05-20");
        assert_eq!(reading.values.hba1c, Some(5.9));
        assert_eq!(form.date(), "2024-06-01");
        assert_eq!(form.text(Biomarker::Hba1c), "");
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_await_policy_resets_after_save() {
        let mut form = ReadingForm::new(today());
        form.set_text(Biomarker::Hba1c, "6.1");

        form.begin_submit(SubmitPolicy::AwaitPersistence, today()).unwrap();
        assert!(form.is_submitting());
        assert_eq!(form.text(Biomarker::Hba1c), "6.1");
        assert_eq!(
            form.begin_submit(SubmitPolicy::AwaitPersistence, today()),
            Err(FormError::SubmissionPending)
        );

        form.finish_submit(false, today());
        assert_eq!(form.text(Biomarker::Hba1c), "6.1");

        form.begin_submit(SubmitPolicy::AwaitPersistence, today()).unwrap();
        form.finish_submit(true, today());
        assert_eq!(form.text(Biomarker::Hba1c), "");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("await".parse::<SubmitPolicy>(), Ok(SubmitPolicy::AwaitPersistence));
        assert_eq!("Fire-And-Forget".parse::<SubmitPolicy>(), Ok(SubmitPolicy::FireAndForget));
        assert!("later".parse::<SubmitPolicy>().is_err());
        assert_eq!(SubmitPolicy::FireAndForget.to_string(), "fire-and-forget");
    }

    #[tokio::test]
    async fn test_submit_reading_sends_derived_ratio() {
        let mut api = MockHealthApi::new();
        api.expect_add_reading()
            .with(function(|record: &metabolic_monitor_data::models::ReadingRecord| {
                record.date == "2024-05-20" && record.values.triglyceride_hdl_ratio == Some(2.0)
            }))
            .times(1)
            .returning(|_| Ok(Acknowledgement::default()));

        let reading = Reading::new(
            "2024-05-20",
            BiomarkerValues {
                triglycerides: Some(3.0),
                hdl_cholesterol: Some(1.5),
                ..Default::default()
            },
        );
        submit_reading(&api, &reading).await.unwrap();
    }
}
