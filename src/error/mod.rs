//! Error handling for cardiovascular risk prediction and cohort analysis.
//!
//! Errors fall into three groups:
//! - fatal startup errors (model artifacts missing or unreadable),
//! - per-request errors (malformed input, unknown category),
//! - data errors raised while loading or analysing a cohort.
//!
//! Advisories are not errors; see [`crate::algorithm::advisory`].

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

pub mod util;

/// Specialized error type for the crate
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    /// A model artifact could not be found or deserialized at startup
    #[error("Model artifact missing: {artifact} ({path}): {reason}")]
    ModelArtifactMissing {
        /// Which artifact failed (encoder, scaler, classifier)
        artifact: &'static str,
        /// Where it was expected
        path: PathBuf,
        /// Underlying reason
        reason: String,
    },

    /// A model artifact was loaded but is internally inconsistent
    #[error("Invalid model artifact {artifact}: {reason}")]
    InvalidArtifact {
        /// Which artifact is inconsistent
        artifact: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// A required field is missing or not numeric
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the offending field
        field: &'static str,
        /// User-facing description
        reason: String,
    },

    /// Cholesterol or glucose value has no encoder mapping
    #[error("Invalid category for '{field}': {value} (expected one of 1, 2, 3)")]
    InvalidCategory {
        /// Name of the categorical column
        field: &'static str,
        /// The rejected value
        value: i64,
    },

    /// A dataset column is absent
    #[error("Column not found: {column}")]
    MissingColumn {
        /// Column name
        column: String,
    },

    /// Not enough (or degenerate) data for a statistic
    #[error("Insufficient data for {statistic}: {reason}")]
    InsufficientData {
        /// Name of the statistic
        statistic: &'static str,
        /// Why it could not be computed
        reason: String,
    },

    /// A reference distribution could not be constructed
    #[error("Invalid {distribution} distribution: {reason}")]
    Distribution {
        /// Name of the distribution
        distribution: &'static str,
        /// Parameter error reported by `statrs`
        reason: String,
    },

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Conversion between record batches and records failed
    #[error("Record conversion error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),
}

impl CardioError {
    /// Create a missing-artifact error for the given path
    pub fn artifact_missing(
        artifact: &'static str,
        path: &Path,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::ModelArtifactMissing {
            artifact,
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create an inconsistent-artifact error
    pub fn invalid_artifact(artifact: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            artifact,
            reason: reason.into(),
        }
    }

    /// Create an invalid-input error for a named field
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Create an insufficient-data error for a named statistic
    pub fn insufficient_data(statistic: &'static str, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            statistic,
            reason: reason.into(),
        }
    }

    /// Create an error for rejected distribution parameters
    pub fn distribution(distribution: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Distribution {
            distribution,
            reason: reason.to_string(),
        }
    }

    /// Whether this error only affects the current request
    ///
    /// Request-level errors are turned into a user-visible message at the
    /// boundary; everything else is a fault of the process or its data.
    #[must_use]
    pub const fn is_request_error(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::InvalidCategory { .. })
    }
}

/// Result type for crate operations
pub type Result<T> = std::result::Result<T, CardioError>;
