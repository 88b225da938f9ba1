use std::fmt;

use serde::{Deserialize, Serialize};

/// Biomarkers a user can enter on the form
///
/// The triglyceride/HDL ratio is not listed: it is always derived, see
/// [`triglyceride_hdl_ratio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Biomarker {
    HsCrp,
    Hba1c,
    FastingGlucose,
    LdlCholesterol,
    Triglycerides,
    HdlCholesterol,
    AltLiverEnzymes,
}

impl Biomarker {
    /// Every editable biomarker in form order
    pub const ALL: [Biomarker; 7] = [
        Biomarker::HsCrp,
        Biomarker::Hba1c,
        Biomarker::FastingGlucose,
        Biomarker::LdlCholesterol,
        Biomarker::Triglycerides,
        Biomarker::HdlCholesterol,
        Biomarker::AltLiverEnzymes,
    ];

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Biomarker::HsCrp => "hsCRP",
            Biomarker::Hba1c => "HbA1c",
            Biomarker::FastingGlucose => "Fasting Glucose",
            Biomarker::LdlCholesterol => "LDL Cholesterol",
            Biomarker::Triglycerides => "Triglycerides",
            Biomarker::HdlCholesterol => "HDL Cholesterol",
            Biomarker::AltLiverEnzymes => "ALT Liver Enzymes",
        }
    }

    /// Measurement unit shown next to the input
    pub fn unit(&self) -> &'static str {
        match self {
            Biomarker::HsCrp => "mg/L",
            Biomarker::Hba1c => "%",
            Biomarker::AltLiverEnzymes => "U/L",
            Biomarker::FastingGlucose
            | Biomarker::LdlCholesterol
            | Biomarker::Triglycerides
            | Biomarker::HdlCholesterol => "mmol/L",
        }
    }
}

impl fmt::Display for Biomarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Measured values for one date; every value is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerValues {
    pub hs_crp: Option<f64>,
    pub hba1c: Option<f64>,
    pub fasting_glucose: Option<f64>,
    pub ldl_cholesterol: Option<f64>,
    pub triglycerides: Option<f64>,
    pub hdl_cholesterol: Option<f64>,
    pub alt_liver_enzymes: Option<f64>,
}

impl BiomarkerValues {
    pub fn get(&self, biomarker: Biomarker) -> Option<f64> {
        match biomarker {
            Biomarker::HsCrp => self.hs_crp,
            Biomarker::Hba1c => self.hba1c,
            Biomarker::FastingGlucose => self.fasting_glucose,
            Biomarker::LdlCholesterol => self.ldl_cholesterol,
            Biomarker::Triglycerides => self.triglycerides,
            Biomarker::HdlCholesterol => self.hdl_cholesterol,
            Biomarker::AltLiverEnzymes => self.alt_liver_enzymes,
        }
    }

    pub fn set(&mut self, biomarker: Biomarker, value: Option<f64>) {
        let slot = match biomarker {
            Biomarker::HsCrp => &mut self.hs_crp,
            Biomarker::Hba1c => &mut self.hba1c,
            Biomarker::FastingGlucose => &mut self.fasting_glucose,
            Biomarker::LdlCholesterol => &mut self.ldl_cholesterol,
            Biomarker::Triglycerides => &mut self.triglycerides,
            Biomarker::HdlCholesterol => &mut self.hdl_cholesterol,
            Biomarker::AltLiverEnzymes => &mut self.alt_liver_enzymes,
        };
        *slot = value;
    }

    /// Derived triglyceride/HDL ratio for these values
    pub fn triglyceride_hdl_ratio(&self) -> Option<f64> {
        triglyceride_hdl_ratio(self.triglycerides, self.hdl_cholesterol)
    }
}

/// One dated set of biomarker measurements, identified by its date string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub date: String,
    pub values: BiomarkerValues,
}

impl Reading {
    pub fn new(date: impl Into<String>, values: BiomarkerValues) -> Self {
        Self {
            date: date.into(),
            values,
        }
    }

    pub fn triglyceride_hdl_ratio(&self) -> Option<f64> {
        self.values.triglyceride_hdl_ratio()
    }
}

/// Triglycerides divided by HDL, rounded to two decimals
///
/// Absent when either input is absent or HDL is zero.
pub fn triglyceride_hdl_ratio(triglycerides: Option<f64>, hdl: Option<f64>) -> Option<f64> {
    let (tg, hdl) = (triglycerides?, hdl?);
    if hdl == 0.0 {
        return None;
    }
    let ratio = (tg / hdl * 100.0).round() / 100.0;
    ratio.is_finite().then_some(ratio)
}
