//! Cohort reports
//!
//! Plain-text summaries of a cleaned cohort: descriptive statistics per
//! parameter and comparisons between subjects with and without
//! cardiovascular disease.

pub mod format;
pub mod parameter;
pub mod summary;

pub use format::{format_pvalue, mean_sd_text, normality_text, percentage_text, range_text};
pub use parameter::{CATALOGUE, Parameter, ParameterKind, find_parameter};
pub use summary::{
    CardioComparison, CategoricalRow, ContinuousRow, GroupDescription, ModalityShare, association,
    categorical_row, compare_by_cardio, contingency_table, continuous_row, correlation,
    generate_summary,
};
