//! Risk prediction, advisories and cohort statistics
//!
//! `prediction` holds the fitted model pipeline, `advisory` the rules that
//! flag inputs the model was not trained for, and `statistics` the tests
//! quoted in the cohort reports.

pub mod advisory;
pub mod prediction;
pub mod statistics;
