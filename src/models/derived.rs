//! Derived clinical features
//!
//! Pure functions computing body-mass index, mean arterial pressure and age in
//! years. They feed both the prediction pipeline and the cohort statistics.

use crate::error::{CardioError, Result};

/// Days per year used to convert the raw export's age column
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Round to one decimal place (half away from zero)
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Body-mass index from weight (kg) and height (cm), rounded to 1 decimal
///
/// # Errors
/// Returns `InvalidInput` when `height_cm` or `weight_kg` is not strictly
/// positive.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Result<f64> {
    if !height_cm.is_finite() || height_cm <= 0.0 {
        return Err(CardioError::invalid_input(
            "height",
            format!("height must be positive, got {height_cm}"),
        ));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(CardioError::invalid_input(
            "weight",
            format!("weight must be positive, got {weight_kg}"),
        ));
    }
    let height_m = height_cm / 100.0;
    Ok(round1(weight_kg / (height_m * height_m)))
}

/// Mean arterial pressure `(systolic + 2 * diastolic) / 3`, rounded to 1 decimal
#[must_use]
pub fn compute_mean_arterial_pressure(systolic: f64, diastolic: f64) -> f64 {
    round1(2.0f64.mul_add(diastolic, systolic) / 3.0)
}

/// Convert an age given in days to (fractional) years
#[must_use]
pub fn age_from_days(days: f64) -> f64 {
    days / DAYS_PER_YEAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_reference_value() {
        let bmi = compute_bmi(70.0, 170.0).unwrap();
        assert!((bmi - 24.2).abs() < 1e-9, "got {bmi}");
    }

    #[test]
    fn test_bmi_rejects_non_positive_height() {
        assert!(matches!(
            compute_bmi(70.0, 0.0),
            Err(CardioError::InvalidInput { field: "height", .. })
        ));
        assert!(compute_bmi(70.0, -170.0).is_err());
    }

    #[test]
    fn test_bmi_rejects_non_positive_weight() {
        assert!(matches!(
            compute_bmi(0.0, 170.0),
            Err(CardioError::InvalidInput { field: "weight", .. })
        ));
        assert!(matches!(
            compute_bmi(-70.0, 170.0),
            Err(CardioError::InvalidInput { field: "weight", .. })
        ));
    }

    #[test]
    fn test_mean_arterial_pressure() {
        let map = compute_mean_arterial_pressure(120.0, 80.0);
        assert!((map - 93.3).abs() < 1e-9, "got {map}");
        assert!((compute_mean_arterial_pressure(140.0, 90.0) - 106.7).abs() < 1e-9);
    }

    #[test]
    fn test_age_from_days() {
        assert!((age_from_days(18262.5) - 50.0).abs() < 1e-9);
    }
}
