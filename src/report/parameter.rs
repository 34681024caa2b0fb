//! Catalogue of cohort parameters
//!
//! Each entry names a cohort column, how to label it and, for categorical
//! columns, the modality keys in display order with their names.

use std::fmt;

/// Whether a column is summarized by moments or by modality shares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// Numeric column
    Continuous,
    /// Coded column with a fixed set of modalities
    Categorical {
        /// Modality keys as they appear in the data
        modalities: &'static [&'static str],
        /// Display names, same order as `modalities`
        modality_names: &'static [&'static str],
    },
}

/// A cohort column with its presentation metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    /// Column name
    pub name: &'static str,
    /// Human-readable name
    pub full_name: &'static str,
    /// Unit, if any
    pub unit: Option<&'static str>,
    /// Continuous or categorical
    pub kind: ParameterKind,
}

impl Parameter {
    const fn continuous(name: &'static str, full_name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            full_name,
            unit: Some(unit),
            kind: ParameterKind::Continuous,
        }
    }

    const fn categorical(
        name: &'static str,
        full_name: &'static str,
        modalities: &'static [&'static str],
        modality_names: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            full_name,
            unit: None,
            kind: ParameterKind::Categorical {
                modalities,
                modality_names,
            },
        }
    }

    /// Full name followed by the unit in parentheses, when there is one
    #[must_use]
    pub fn label(&self) -> String {
        match self.unit {
            Some(unit) => format!("{} ({unit})", self.full_name),
            None => self.full_name.to_string(),
        }
    }

    /// Whether the column is categorical
    #[must_use]
    pub const fn is_categorical(&self) -> bool {
        matches!(self.kind, ParameterKind::Categorical { .. })
    }

    /// Modality keys paired with their display names
    #[must_use]
    pub fn modalities(&self) -> Vec<(&'static str, &'static str)> {
        match self.kind {
            ParameterKind::Continuous => Vec::new(),
            ParameterKind::Categorical {
                modalities,
                modality_names,
            } => modalities.iter().copied().zip(modality_names.iter().copied()).collect(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

const BINARY: &[&str] = &["0", "1"];
const NO_YES: &[&str] = &["No", "Yes"];
const LEVELS: &[&str] = &["1", "2", "3"];
const LEVEL_NAMES: &[&str] = &["Normal", "Above normal", "Well above normal"];

/// Age in years
pub const AGE: Parameter = Parameter::continuous("age", "Age", "years");
/// Sex
pub const SEX: Parameter = Parameter::categorical("sex", "Sex", &["female", "male"], &["Female", "Male"]);
/// Height
pub const HEIGHT: Parameter = Parameter::continuous("height", "Height", "cm");
/// Weight
pub const WEIGHT: Parameter = Parameter::continuous("weight", "Weight", "kg");
/// Systolic blood pressure
pub const AP_HI: Parameter = Parameter::continuous("ap_hi", "Systolic Blood Pressure", "mmHg");
/// Diastolic blood pressure
pub const AP_LO: Parameter = Parameter::continuous("ap_lo", "Diastolic Blood Pressure", "mmHg");
/// Cholesterol level
pub const CHOLESTEROL: Parameter = Parameter::categorical("cholesterol", "Cholesterol", LEVELS, LEVEL_NAMES);
/// Glucose level
pub const GLUC: Parameter = Parameter::categorical("gluc", "Glucose", LEVELS, LEVEL_NAMES);
/// Smoking
pub const SMOKE: Parameter = Parameter::categorical("smoke", "Tobacco", BINARY, NO_YES);
/// Alcohol intake
pub const ALCO: Parameter = Parameter::categorical("alco", "Alcohol", BINARY, NO_YES);
/// Physical activity
pub const ACTIVE: Parameter = Parameter::categorical("active", "Physical Activity", BINARY, NO_YES);
/// Outcome
pub const CARDIO: Parameter = Parameter::categorical("cardio", "Cardiovascular Disease", BINARY, NO_YES);
/// Body-mass index
pub const BMI: Parameter = Parameter::continuous("bmi", "BMI", "kg/m²");
/// Mean arterial pressure
pub const AP_M: Parameter = Parameter::continuous("ap_m", "Mean Blood Pressure", "mmHg");
/// AHA blood pressure status
pub const AP_AHA: Parameter = Parameter::categorical(
    "ap_aha",
    "Blood Pressure Status",
    &["1", "2", "3", "4"],
    &["Normal", "Elevated", "Hypertension stage I", "Hypertension stage II"],
);
/// Lifestyle profile
pub const LIFESTYLE: Parameter = Parameter::categorical(
    "lifestyle",
    "Lifestyle",
    &["0", "1", "2", "3", "4", "5", "6", "7"],
    &[
        "Non-smoker, No alcohol, Active",
        "Smoker",
        "Alcohol",
        "Not Active",
        "Smoker & Alcohol",
        "Smoker & Not active",
        "Alcohol & Not active",
        "Smoker & Alcohol & Not active",
    ],
);
/// Healthy lifestyle flag
pub const HEALTHY_LS: Parameter = Parameter::categorical("healthy_ls", "Healthy Lifestyle", BINARY, NO_YES);

/// Every cohort parameter in report order
pub const CATALOGUE: [Parameter; 17] = [
    AGE, SEX, HEIGHT, WEIGHT, AP_HI, AP_LO, CHOLESTEROL, GLUC, SMOKE, ALCO, ACTIVE, CARDIO, BMI,
    AP_M, AP_AHA, LIFESTYLE, HEALTHY_LS,
];

/// Look up a parameter by column name
#[must_use]
pub fn find_parameter(name: &str) -> Option<&'static Parameter> {
    CATALOGUE.iter().find(|p| p.name == name)
}
