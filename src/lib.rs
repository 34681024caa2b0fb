//! Cardiovascular disease risk assessment
//!
//! Derives BMI and mean arterial pressure from a handful of clinical
//! measurements, scores them with a fitted label-encoder, min-max scaler
//! and SVM pipeline, and attaches advisories for inputs outside what the
//! model was trained on. Cohort files can be cleaned, summarized and used
//! to evaluate a model.

pub mod algorithm;
pub mod async_io;
pub mod config;
pub mod error;
pub mod models;
pub mod reader;
pub mod report;
pub mod utils;

// Core types
pub use config::{AdvisoryThresholds, CardioConfig, CleaningConfig, DEFAULT_BATCH_SIZE};
pub use error::{CardioError, Result};
pub use models::{CohortRecord, FeatureVector, SubjectInput, SubjectRecord};

// Prediction
pub use algorithm::advisory::{Advisories, Advisory, evaluate_advisories};
pub use algorithm::prediction::{
    Assessment, ConfusionMatrix, ModelBundle, PredictionPipeline, RiskLabel, evaluate_cohort,
};

// Cohort data
pub use reader::{Cohort, CleaningReport, load_cohort, write_cohort_parquet};
pub use report::generate_summary;

// Async functionality
pub use async_io::{load_cohort_async, write_cohort_parquet_async};

// Arrow types
pub use arrow::record_batch::RecordBatch;
