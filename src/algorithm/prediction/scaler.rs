//! Min-max feature scaling
//!
//! Mirrors scikit-learn's `MinMaxScaler`: per column,
//! `x' = x * scale + offset` with `scale = (hi - lo) / (data_max - data_min)`
//! and `offset = lo - data_min * scale`. A constant column keeps `scale = 1`.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{CardioError, Result};
use crate::models::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};

/// Per-column affine rescaling of the model inputs
pub trait FeatureScaler: Debug + Send + Sync {
    /// Rescale a feature vector
    fn scale(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT];

    /// Column names the scaler was fitted on, when recorded
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

/// Portable export of a fitted min-max scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScalerExport {
    /// Column names in fitting order
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Per-column minimum seen during fitting
    pub data_min: Vec<f64>,
    /// Per-column maximum seen during fitting
    pub data_max: Vec<f64>,
    /// Target range
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

const fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Fitted min-max scaler over the seven model columns
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    feature_names: Option<Vec<String>>,
    scale: [f64; FEATURE_COUNT],
    offset: [f64; FEATURE_COUNT],
}

impl MinMaxScaler {
    /// Build a scaler from per-column minima and maxima
    #[must_use]
    pub fn new(
        data_min: [f64; FEATURE_COUNT],
        data_max: [f64; FEATURE_COUNT],
        feature_range: (f64, f64),
    ) -> Self {
        let (lo, hi) = feature_range;
        let mut scale = [1.0; FEATURE_COUNT];
        let mut offset = [0.0; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            let range = data_max[i] - data_min[i];
            scale[i] = if range == 0.0 { 1.0 } else { (hi - lo) / range };
            offset[i] = data_min[i].mul_add(-scale[i], lo);
        }
        Self {
            feature_names: None,
            scale,
            offset,
        }
    }

    /// Validate an export and build the scaler
    ///
    /// # Errors
    /// Returns `InvalidArtifact` when the column count is not seven, a minimum
    /// exceeds its maximum, the target range is empty, or the recorded column
    /// names differ from the training order.
    pub fn from_export(export: MinMaxScalerExport) -> Result<Self> {
        let data_min = to_columns("data_min", &export.data_min)?;
        let data_max = to_columns("data_max", &export.data_max)?;

        if let Some(i) = (0..FEATURE_COUNT).find(|&i| data_min[i] > data_max[i]) {
            return Err(CardioError::invalid_artifact(
                "scaler",
                format!("data_min exceeds data_max for column {}", FEATURE_NAMES[i]),
            ));
        }

        let (lo, hi) = export.feature_range;
        if lo >= hi {
            return Err(CardioError::invalid_artifact(
                "scaler",
                format!("empty feature range ({lo}, {hi})"),
            ));
        }

        if let Some(names) = &export.feature_names {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
                return Err(CardioError::invalid_artifact(
                    "scaler",
                    format!(
                        "fitted on columns {names:?}, expected {:?}",
                        FEATURE_NAMES
                    ),
                ));
            }
        }

        let mut scaler = Self::new(data_min, data_max, export.feature_range);
        scaler.feature_names = export.feature_names;
        Ok(scaler)
    }
}

fn to_columns(name: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT]> {
    let columns: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        CardioError::invalid_artifact(
            "scaler",
            format!("{name} has {} columns, expected {FEATURE_COUNT}", values.len()),
        )
    })?;
    if columns.iter().any(|v| !v.is_finite()) {
        return Err(CardioError::invalid_artifact(
            "scaler",
            format!("{name} contains non-finite values"),
        ));
    }
    Ok(columns)
}

impl FeatureScaler for MinMaxScaler {
    fn scale(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut scaled = features.to_array();
        for (i, value) in scaled.iter_mut().enumerate() {
            *value = value.mul_add(self.scale[i], self.offset[i]);
        }
        scaled
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }
}
