//! Cohort cleaning rules
//!
//! Rows are checked in a fixed order and each rejected row is counted once,
//! under the first rule it fails: incomplete row, unknown category code,
//! age below the outlier cut-off, non-positive anthropometry, non-positive
//! pressure, out-of-range pressure. Inverted pressures are swapped before
//! the range check. Ages are in years by the time rows get here.

use std::fmt;

use serde::Serialize;

use crate::config::CleaningConfig;
use crate::models::{CategoryLevel, CohortMeasurements, CohortRecord, Sex};

/// One row as read from a file, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCohortRow {
    /// Subject identifier
    pub id: Option<u64>,
    /// Age in years
    pub age: Option<f64>,
    /// Sex
    pub sex: Option<Sex>,
    /// Height in cm
    pub height: Option<f64>,
    /// Weight in kg
    pub weight: Option<f64>,
    /// Systolic pressure
    pub ap_hi: Option<f64>,
    /// Diastolic pressure
    pub ap_lo: Option<f64>,
    /// Cholesterol code
    pub cholesterol: Option<f64>,
    /// Glucose code
    pub gluc: Option<f64>,
    /// Smoker flag
    pub smoke: Option<f64>,
    /// Alcohol flag
    pub alco: Option<f64>,
    /// Activity flag
    pub active: Option<f64>,
    /// Outcome flag
    pub cardio: Option<f64>,
}

/// Effect of each cleaning rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    /// Rows read
    pub total_rows: usize,
    /// Rows with a missing or non-numeric value
    pub incomplete: usize,
    /// Rows with a cholesterol or glucose code outside 1-3
    pub invalid_category: usize,
    /// Subjects younger than the minimum age
    pub age_out_of_range: usize,
    /// Rows with non-positive height or weight
    pub non_positive_anthropometry: usize,
    /// Rows with a non-positive blood pressure
    pub non_positive_pressure: usize,
    /// Rows whose systolic and diastolic values were swapped (kept)
    pub swapped_pressures: usize,
    /// Rows with systolic pressure outside the cut-offs
    pub systolic_out_of_range: usize,
    /// Rows with diastolic pressure outside the cut-offs
    pub diastolic_out_of_range: usize,
    /// Rows kept
    pub kept: usize,
}

impl CleaningReport {
    /// Rows dropped by any rule
    #[must_use]
    pub const fn dropped(&self) -> usize {
        self.total_rows - self.kept
    }
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning report:")?;
        writeln!(f, "  Rows read: {}", self.total_rows)?;
        writeln!(f, "  Incomplete rows: {}", self.incomplete)?;
        writeln!(f, "  Unknown category codes: {}", self.invalid_category)?;
        writeln!(f, "  Below minimum age: {}", self.age_out_of_range)?;
        writeln!(f, "  Non-positive height/weight: {}", self.non_positive_anthropometry)?;
        writeln!(f, "  Non-positive blood pressure: {}", self.non_positive_pressure)?;
        writeln!(f, "  Swapped systolic/diastolic: {}", self.swapped_pressures)?;
        writeln!(f, "  Systolic out of range: {}", self.systolic_out_of_range)?;
        writeln!(f, "  Diastolic out of range: {}", self.diastolic_out_of_range)?;
        write!(f, "  Rows kept: {} ({} dropped)", self.kept, self.dropped())
    }
}

enum Rejection {
    Incomplete,
    InvalidCategory,
    AgeOutOfRange,
    NonPositiveAnthropometry,
    NonPositivePressure,
    SystolicOutOfRange,
    DiastolicOutOfRange,
}

fn flag(v: f64) -> bool {
    v != 0.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn category(v: f64) -> Option<u8> {
    if v.fract() != 0.0 {
        return None;
    }
    CategoryLevel::from_code(v as i64).map(CategoryLevel::code)
}

/// Validate one row; returns the measurements and whether the pressures were swapped
fn check_row(
    index: usize,
    row: &RawCohortRow,
    config: &CleaningConfig,
) -> Result<(CohortMeasurements, bool), Rejection> {
    let (
        Some(age),
        Some(sex),
        Some(height),
        Some(weight),
        Some(mut ap_hi),
        Some(mut ap_lo),
        Some(cholesterol),
        Some(gluc),
        Some(smoke),
        Some(alco),
        Some(active),
        Some(cardio),
    ) = (
        row.age,
        row.sex,
        row.height,
        row.weight,
        row.ap_hi,
        row.ap_lo,
        row.cholesterol,
        row.gluc,
        row.smoke,
        row.alco,
        row.active,
        row.cardio,
    )
    else {
        return Err(Rejection::Incomplete);
    };

    let (Some(cholesterol), Some(gluc)) = (category(cholesterol), category(gluc)) else {
        return Err(Rejection::InvalidCategory);
    };
    if age < config.min_age {
        return Err(Rejection::AgeOutOfRange);
    }
    if height <= 0.0 || weight <= 0.0 {
        return Err(Rejection::NonPositiveAnthropometry);
    }
    if ap_hi <= 0.0 || ap_lo <= 0.0 {
        return Err(Rejection::NonPositivePressure);
    }

    let swapped = config.swap_inverted_pressures && ap_hi < ap_lo;
    if swapped {
        std::mem::swap(&mut ap_hi, &mut ap_lo);
    }
    if !(config.min_systolic..=config.max_systolic).contains(&ap_hi) {
        return Err(Rejection::SystolicOutOfRange);
    }
    if !(config.min_diastolic..=config.max_diastolic).contains(&ap_lo) {
        return Err(Rejection::DiastolicOutOfRange);
    }

    let measurements = CohortMeasurements {
        id: row.id.unwrap_or(index as u64),
        age,
        sex,
        height,
        weight,
        ap_hi,
        ap_lo,
        cholesterol,
        gluc,
        smoke: flag(smoke),
        alco: flag(alco),
        active: flag(active),
        cardio: flag(cardio),
    };
    Ok((measurements, swapped))
}

/// Apply the cleaning rules and derive the cohort columns
///
/// Rows without an identifier get their position in the input as id.
#[must_use]
pub fn clean_cohort(rows: &[RawCohortRow], config: &CleaningConfig) -> (Vec<CohortRecord>, CleaningReport) {
    let mut report = CleaningReport {
        total_rows: rows.len(),
        ..CleaningReport::default()
    };
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        match check_row(index, row, config) {
            Ok((measurements, swapped)) => match CohortRecord::derive(measurements) {
                Ok(record) => {
                    if swapped {
                        report.swapped_pressures += 1;
                    }
                    records.push(record);
                }
                Err(e) => {
                    log::debug!("Row {index} dropped: {e}");
                    report.non_positive_anthropometry += 1;
                }
            },
            Err(Rejection::Incomplete) => report.incomplete += 1,
            Err(Rejection::InvalidCategory) => report.invalid_category += 1,
            Err(Rejection::AgeOutOfRange) => report.age_out_of_range += 1,
            Err(Rejection::NonPositiveAnthropometry) => report.non_positive_anthropometry += 1,
            Err(Rejection::NonPositivePressure) => report.non_positive_pressure += 1,
            Err(Rejection::SystolicOutOfRange) => report.systolic_out_of_range += 1,
            Err(Rejection::DiastolicOutOfRange) => report.diastolic_out_of_range += 1,
        }
    }

    report.kept = records.len();
    if report.dropped() > 0 {
        log::info!(
            "Dropped {} of {} cohort rows during cleaning",
            report.dropped(),
            report.total_rows
        );
    }
    (records, report)
}
