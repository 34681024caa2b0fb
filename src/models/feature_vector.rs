//! Model input vector
//!
//! The classifier was trained on seven columns in a fixed order. The order is
//! encoded once, in [`FeatureVector::to_array`] and [`FEATURE_NAMES`]; nothing
//! else builds the positional array.

use serde::{Deserialize, Serialize};

/// Number of model input columns
pub const FEATURE_COUNT: usize = 7;

/// Column names in training order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["age", "ap_hi", "ap_lo", "cholesterol", "gluc", "bmi", "ap_m"];

/// Named model inputs, after categorical encoding and before scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Age in years
    pub age: f64,
    /// Systolic pressure
    pub ap_hi: f64,
    /// Diastolic pressure
    pub ap_lo: f64,
    /// Encoded cholesterol
    pub cholesterol: f64,
    /// Encoded glucose
    pub gluc: f64,
    /// Body-mass index
    pub bmi: f64,
    /// Mean arterial pressure
    pub ap_m: f64,
}

impl FeatureVector {
    /// Positional array in training order
    #[must_use]
    pub const fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.ap_hi,
            self.ap_lo,
            self.cholesterol,
            self.gluc,
            self.bmi,
            self.ap_m,
        ]
    }

    /// Rebuild from a positional array in training order
    #[must_use]
    pub const fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        let [age, ap_hi, ap_lo, cholesterol, gluc, bmi, ap_m] = values;
        Self {
            age,
            ap_hi,
            ap_lo,
            cholesterol,
            gluc,
            bmi,
            ap_m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_order_matches_names() {
        let vector = FeatureVector {
            age: 0.0,
            ap_hi: 1.0,
            ap_lo: 2.0,
            cholesterol: 3.0,
            gluc: 4.0,
            bmi: 5.0,
            ap_m: 6.0,
        };
        let array = vector.to_array();
        for (i, value) in array.iter().enumerate() {
            assert!((*value - i as f64).abs() < f64::EPSILON, "{}", FEATURE_NAMES[i]);
        }
        assert_eq!(FeatureVector::from_array(array), vector);
    }
}
