//! Statistics for the cohort reports
//!
//! Descriptive summaries plus the hypothesis tests the reports quote:
//! Shapiro-Wilk normality, Mann-Whitney U, chi-square independence and
//! Spearman correlation.

pub mod descriptive;
pub mod distributions;
pub mod hypothesis;

pub use descriptive::{Summary, frequencies, mean, min_max, percentile, std_dev, summarize, value_counts};
pub use hypothesis::{
    ContingencyResult, TestResult, chi2_contingency, mann_whitney_u, rank_average, shapiro_wilk,
    spearman,
};
