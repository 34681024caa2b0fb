//! Categorical encoding for cholesterol and glucose
//!
//! The cohort's two ordinal columns share the category set {1, 2, 3}, so a
//! single fitted encoder is applied to both.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{CardioError, Result};

/// Maps a categorical code to the value fed to the scaler
pub trait CategoryEncoder: Debug + Send + Sync {
    /// Encode `value` for the named column
    ///
    /// # Errors
    /// Returns `InvalidCategory` when the encoder has no mapping for `value`.
    fn encode(&self, field: &'static str, value: i64) -> Result<f64>;
}

/// Fitted label encoder: each known class maps to its index in sorted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<i64>,
}

impl LabelEncoder {
    /// Create an encoder from its fitted classes
    ///
    /// # Errors
    /// Returns `InvalidArtifact` if the classes are empty or not strictly
    /// increasing.
    pub fn new(classes: Vec<i64>) -> Result<Self> {
        let encoder = Self { classes };
        encoder.validate()?;
        Ok(encoder)
    }

    /// Check the invariants of a deserialized encoder
    ///
    /// # Errors
    /// Returns `InvalidArtifact` if the classes are empty or unsorted.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(CardioError::invalid_artifact("encoder", "no classes"));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CardioError::invalid_artifact(
                "encoder",
                "classes must be sorted and unique",
            ));
        }
        Ok(())
    }

    /// Fitted classes in encoding order
    #[must_use]
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }
}

impl CategoryEncoder for LabelEncoder {
    #[allow(clippy::cast_precision_loss)]
    fn encode(&self, field: &'static str, value: i64) -> Result<f64> {
        self.classes
            .binary_search(&value)
            .map(|index| index as f64)
            .map_err(|_| CardioError::InvalidCategory { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_classes() {
        let encoder = LabelEncoder::new(vec![1, 2, 3]).unwrap();
        assert!((encoder.encode("cholesterol", 1).unwrap() - 0.0).abs() < f64::EPSILON);
        assert!((encoder.encode("cholesterol", 3).unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_encode_unknown_class() {
        let encoder = LabelEncoder::new(vec![1, 2, 3]).unwrap();
        assert!(matches!(
            encoder.encode("gluc", 4),
            Err(CardioError::InvalidCategory { field: "gluc", value: 4 })
        ));
        assert!(encoder.encode("gluc", 0).is_err());
    }

    #[test]
    fn test_invalid_classes_rejected() {
        assert!(LabelEncoder::new(vec![]).is_err());
        assert!(LabelEncoder::new(vec![2, 1, 3]).is_err());
        assert!(LabelEncoder::new(vec![1, 1, 2]).is_err());
    }

    #[test]
    fn test_json_shape() {
        let encoder: LabelEncoder = serde_json::from_str(r#"{"classes": [1, 2, 3]}"#).unwrap();
        assert_eq!(encoder.classes(), &[1, 2, 3]);
    }
}
