//! Subject record for a single prediction request
//!
//! A [`SubjectRecord`] is built fresh from user input on each request and is
//! discarded once the response has been produced.

use serde::{Deserialize, Serialize};

use crate::error::{CardioError, Result};
use crate::models::derived::{compute_bmi, compute_mean_arterial_pressure};

/// Clinical measurements of one subject plus the two derived features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Age in years
    pub age: u32,
    /// Weight in kg
    pub weight: f64,
    /// Height in cm
    pub height: f64,
    /// Systolic blood pressure (`ap_hi`) in mmHg
    pub systolic_pressure: f64,
    /// Diastolic blood pressure (`ap_lo`) in mmHg
    pub diastolic_pressure: f64,
    /// Cholesterol category code; valid codes are 1, 2 and 3
    pub cholesterol: i64,
    /// Glucose category code; valid codes are 1, 2 and 3
    pub glucose: i64,
    /// Body-mass index, derived
    pub bmi: f64,
    /// Mean arterial pressure (`ap_m`), derived
    pub mean_arterial_pressure: f64,
}

impl SubjectRecord {
    /// Build a record and compute its derived features
    ///
    /// Category codes are not checked here; the prediction pipeline rejects
    /// codes its encoder does not know.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the height or weight is not strictly
    /// positive.
    pub fn new(
        age: u32,
        weight: f64,
        height: f64,
        systolic_pressure: f64,
        diastolic_pressure: f64,
        cholesterol: i64,
        glucose: i64,
    ) -> Result<Self> {
        Ok(Self {
            age,
            weight,
            height,
            systolic_pressure,
            diastolic_pressure,
            cholesterol,
            glucose,
            bmi: compute_bmi(weight, height)?,
            mean_arterial_pressure: compute_mean_arterial_pressure(
                systolic_pressure,
                diastolic_pressure,
            ),
        })
    }
}

/// Raw, untyped form input for a prediction request
///
/// Fields hold the text exactly as submitted; [`SubjectInput::parse`] turns
/// them into a [`SubjectRecord`] or a per-request validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectInput {
    /// Age in years
    pub age: Option<String>,
    /// Weight in kg
    pub weight: Option<String>,
    /// Height in cm
    pub height: Option<String>,
    /// Systolic pressure in mmHg
    pub ap_hi: Option<String>,
    /// Diastolic pressure in mmHg
    pub ap_lo: Option<String>,
    /// Cholesterol category
    pub cholesterol: Option<String>,
    /// Glucose category
    pub gluc: Option<String>,
}

impl SubjectInput {
    /// Collect fields from `key=value` pairs; unknown keys are ignored
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut input = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref().trim() {
                "age" => &mut input.age,
                "weight" => &mut input.weight,
                "height" => &mut input.height,
                "ap_hi" | "systolic" => &mut input.ap_hi,
                "ap_lo" | "diastolic" => &mut input.ap_lo,
                "cholesterol" => &mut input.cholesterol,
                "gluc" | "glucose" => &mut input.gluc,
                other => {
                    log::debug!("Ignoring unknown input field '{other}'");
                    continue;
                }
            };
            *slot = Some(value.into());
        }
        input
    }

    /// Validate and convert into a subject record
    ///
    /// # Errors
    /// Returns `InvalidInput` naming the first missing or non-numeric field.
    pub fn parse(&self) -> Result<SubjectRecord> {
        let age = parse_field::<u32>("age", self.age.as_deref())?;
        let weight = parse_number("weight", self.weight.as_deref())?;
        let height = parse_number("height", self.height.as_deref())?;
        let ap_hi = parse_number("ap_hi", self.ap_hi.as_deref())?;
        let ap_lo = parse_number("ap_lo", self.ap_lo.as_deref())?;
        let cholesterol = parse_field::<i64>("cholesterol", self.cholesterol.as_deref())?;
        let gluc = parse_field::<i64>("gluc", self.gluc.as_deref())?;

        SubjectRecord::new(age, weight, height, ap_hi, ap_lo, cholesterol, gluc)
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CardioError::invalid_input(field, "value is required")),
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: Option<&str>) -> Result<T> {
    let raw = required(field, value)?;
    raw.parse::<T>().map_err(|_| {
        CardioError::invalid_input(field, format!("'{raw}' is not a valid whole number"))
    })
}

fn parse_number(field: &'static str, value: Option<&str>) -> Result<f64> {
    let raw = required(field, value)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CardioError::invalid_input(
            field,
            format!("'{raw}' is not a valid number"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_input() -> SubjectInput {
        SubjectInput::from_pairs([
            ("age", "50"),
            ("weight", "70"),
            ("height", "170"),
            ("ap_hi", "120"),
            ("ap_lo", "80"),
            ("cholesterol", "1"),
            ("gluc", "1"),
        ])
    }

    #[test]
    fn test_new_computes_derived_features() {
        let subject = SubjectRecord::new(50, 70.0, 170.0, 120.0, 80.0, 1, 1).unwrap();
        assert!((subject.bmi - 24.2).abs() < 1e-9);
        assert!((subject.mean_arterial_pressure - 93.3).abs() < 1e-9);
    }

    #[test]
    fn test_new_rejects_non_positive_weight() {
        for weight in [0.0, -70.0] {
            assert!(matches!(
                SubjectRecord::new(50, weight, 170.0, 120.0, 80.0, 1, 1),
                Err(CardioError::InvalidInput { field: "weight", .. })
            ));
        }

        let mut input = complete_input();
        input.weight = Some("0".to_string());
        assert!(matches!(
            input.parse(),
            Err(CardioError::InvalidInput { field: "weight", .. })
        ));
    }

    #[test]
    fn test_parse_complete_input() {
        let subject = complete_input().parse().unwrap();
        assert_eq!(subject.age, 50);
        assert_eq!(subject.cholesterol, 1);
        assert!((subject.bmi - 24.2).abs() < 1e-9);
    }

    #[test]
    fn test_parse_reports_missing_field() {
        let mut input = complete_input();
        input.ap_lo = Some("   ".to_string());
        let err = input.parse().unwrap_err();
        assert!(matches!(err, CardioError::InvalidInput { field: "ap_lo", .. }));
        assert!(err.is_request_error());
    }

    #[test]
    fn test_parse_rejects_non_numeric_age() {
        let mut input = complete_input();
        input.age = Some("fifty".to_string());
        assert!(matches!(
            input.parse(),
            Err(CardioError::InvalidInput { field: "age", .. })
        ));
    }

    #[test]
    fn test_parse_keeps_unknown_category_for_pipeline() {
        let mut input = complete_input();
        input.cholesterol = Some("4".to_string());
        assert_eq!(input.parse().unwrap().cholesterol, 4);
    }

    #[test]
    fn test_aliases_and_unknown_keys() {
        let input = SubjectInput::from_pairs([("systolic", "130"), ("glucose", "2"), ("bogus", "x")]);
        assert_eq!(input.ap_hi.as_deref(), Some("130"));
        assert_eq!(input.gluc.as_deref(), Some("2"));
        assert!(input.age.is_none());
    }
}
