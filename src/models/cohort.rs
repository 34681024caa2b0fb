//! Cohort record model
//!
//! One row of the cleaned cardiovascular cohort, including the derived
//! features used by the reports.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::derived::{compute_bmi, compute_mean_arterial_pressure};
use crate::models::subject::SubjectRecord;
use crate::models::types::{BloodPressureCategory, Lifestyle, Sex};

/// A cleaned cohort subject
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRecord {
    /// Subject identifier
    pub id: u64,
    /// Age in years
    pub age: f64,
    /// Sex
    pub sex: Sex,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    /// Systolic pressure in mmHg
    pub ap_hi: f64,
    /// Diastolic pressure in mmHg
    pub ap_lo: f64,
    /// Cholesterol category (1-3)
    pub cholesterol: u8,
    /// Glucose category (1-3)
    pub gluc: u8,
    /// Smoker
    pub smoke: bool,
    /// Drinks alcohol
    pub alco: bool,
    /// Physically active
    pub active: bool,
    /// Cardiovascular disease present
    pub cardio: bool,
    /// Body-mass index
    pub bmi: f64,
    /// Mean arterial pressure
    pub ap_m: f64,
    /// AHA blood pressure status
    pub ap_aha: BloodPressureCategory,
    /// Lifestyle profile
    pub lifestyle: Lifestyle,
    /// Whether the lifestyle profile is the healthy one
    pub healthy_ls: bool,
}

/// Measured cohort columns, before derivation
#[derive(Debug, Clone, PartialEq)]
pub struct CohortMeasurements {
    /// Subject identifier
    pub id: u64,
    /// Age in years
    pub age: f64,
    /// Sex
    pub sex: Sex,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    /// Systolic pressure in mmHg
    pub ap_hi: f64,
    /// Diastolic pressure in mmHg
    pub ap_lo: f64,
    /// Cholesterol category (1-3)
    pub cholesterol: u8,
    /// Glucose category (1-3)
    pub gluc: u8,
    /// Smoker
    pub smoke: bool,
    /// Drinks alcohol
    pub alco: bool,
    /// Physically active
    pub active: bool,
    /// Cardiovascular disease present
    pub cardio: bool,
}

impl CohortRecord {
    /// Compute the derived columns for a measured row
    ///
    /// # Errors
    /// Returns `InvalidInput` when the height or weight is not strictly positive.
    pub fn derive(m: CohortMeasurements) -> Result<Self> {
        let bmi = compute_bmi(m.weight, m.height)?;
        let ap_m = compute_mean_arterial_pressure(m.ap_hi, m.ap_lo);
        let lifestyle = Lifestyle::from_habits(m.smoke, m.alco, m.active);

        Ok(Self {
            id: m.id,
            age: m.age,
            sex: m.sex,
            height: m.height,
            weight: m.weight,
            ap_hi: m.ap_hi,
            ap_lo: m.ap_lo,
            cholesterol: m.cholesterol,
            gluc: m.gluc,
            smoke: m.smoke,
            alco: m.alco,
            active: m.active,
            cardio: m.cardio,
            bmi,
            ap_m,
            ap_aha: BloodPressureCategory::classify(m.ap_hi, m.ap_lo),
            lifestyle,
            healthy_ls: lifestyle.is_healthy(),
        })
    }

    /// Subject record for scoring this row with the prediction pipeline
    ///
    /// The age is truncated to whole years.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_subject(&self) -> SubjectRecord {
        SubjectRecord {
            age: self.age.max(0.0) as u32,
            weight: self.weight,
            height: self.height,
            systolic_pressure: self.ap_hi,
            diastolic_pressure: self.ap_lo,
            cholesterol: i64::from(self.cholesterol),
            glucose: i64::from(self.gluc),
            bmi: self.bmi,
            mean_arterial_pressure: self.ap_m,
        }
    }

    /// Numeric value of a continuous column by name
    #[must_use]
    pub fn continuous(&self, column: &str) -> Option<f64> {
        match column {
            "age" => Some(self.age),
            "height" => Some(self.height),
            "weight" => Some(self.weight),
            "ap_hi" => Some(self.ap_hi),
            "ap_lo" => Some(self.ap_lo),
            "bmi" => Some(self.bmi),
            "ap_m" => Some(self.ap_m),
            _ => None,
        }
    }

    /// Modality key of a categorical column by name
    ///
    /// Keys match the cohort's textual codes (`"1"`, `"female"`, ...).
    #[must_use]
    pub fn modality(&self, column: &str) -> Option<String> {
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        match column {
            "sex" => Some(self.sex.as_str().to_string()),
            "cholesterol" => Some(self.cholesterol.to_string()),
            "gluc" => Some(self.gluc.to_string()),
            "smoke" => Some(flag(self.smoke)),
            "alco" => Some(flag(self.alco)),
            "active" => Some(flag(self.active)),
            "cardio" => Some(flag(self.cardio)),
            "ap_aha" => Some(self.ap_aha.code().to_string()),
            "lifestyle" => Some(self.lifestyle.code().to_string()),
            "healthy_ls" => Some(flag(self.healthy_ls)),
            _ => None,
        }
    }
}

/// Flat row used when exporting the cleaned cohort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortExportRow {
    /// Subject identifier
    pub id: u64,
    /// Age in years
    pub age: f64,
    /// `female` or `male`
    pub sex: String,
    /// Height in cm
    pub height: f64,
    /// Weight in kg
    pub weight: f64,
    /// Systolic pressure
    pub ap_hi: f64,
    /// Diastolic pressure
    pub ap_lo: f64,
    /// Cholesterol category
    pub cholesterol: u8,
    /// Glucose category
    pub gluc: u8,
    /// Smoker flag
    pub smoke: u8,
    /// Alcohol flag
    pub alco: u8,
    /// Activity flag
    pub active: u8,
    /// Outcome flag
    pub cardio: u8,
    /// Body-mass index
    pub bmi: f64,
    /// Mean arterial pressure
    pub ap_m: f64,
    /// AHA category code
    pub ap_aha: u8,
    /// Lifestyle code
    pub lifestyle: u8,
    /// Healthy lifestyle flag
    pub healthy_ls: u8,
}

impl From<&CohortRecord> for CohortExportRow {
    fn from(r: &CohortRecord) -> Self {
        Self {
            id: r.id,
            age: r.age,
            sex: r.sex.as_str().to_string(),
            height: r.height,
            weight: r.weight,
            ap_hi: r.ap_hi,
            ap_lo: r.ap_lo,
            cholesterol: r.cholesterol,
            gluc: r.gluc,
            smoke: u8::from(r.smoke),
            alco: u8::from(r.alco),
            active: u8::from(r.active),
            cardio: u8::from(r.cardio),
            bmi: r.bmi,
            ap_m: r.ap_m,
            ap_aha: r.ap_aha.code(),
            lifestyle: r.lifestyle.code(),
            healthy_ls: u8::from(r.healthy_ls),
        }
    }
}
