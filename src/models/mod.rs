//! Domain models
//!
//! Subject records for single predictions, the model input vector, cohort
//! records for the descriptive reports, and the shared categorical types.

pub mod cohort;
pub mod derived;
pub mod feature_vector;
pub mod subject;
pub mod types;

// Re-export commonly used types
pub use cohort::{CohortExportRow, CohortMeasurements, CohortRecord};
pub use derived::{DAYS_PER_YEAR, age_from_days, compute_bmi, compute_mean_arterial_pressure, round1};
pub use feature_vector::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use subject::{SubjectInput, SubjectRecord};
pub use types::{BloodPressureCategory, CategoryLevel, Lifestyle, Sex};
