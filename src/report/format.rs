//! Text fragments used in the cohort reports

use crate::algorithm::statistics::{Summary, TestResult};

/// p-values below this are printed as an upper bound
pub const PVALUE_FLOOR: f64 = 1e-4;

/// Shapiro-Wilk p-values at or above this read as normally distributed
pub const NORMALITY_ALPHA: f64 = 0.05;

/// Format a p-value: `p < 10⁻⁴` below the floor, four decimals otherwise
#[must_use]
pub fn format_pvalue(p: f64) -> String {
    if p < PVALUE_FLOOR {
        "p < 10⁻⁴".to_string()
    } else {
        format!("p = {p:.4}")
    }
}

/// Narrative for a Shapiro-Wilk result
#[must_use]
pub fn normality_text(result: &TestResult) -> String {
    let verdict = if result.p_value >= NORMALITY_ALPHA {
        "Normally distributed"
    } else {
        "Not normally distributed"
    };
    format!("{verdict}, {}", format_pvalue(result.p_value))
}

/// `mean ± sd` with one decimal
#[must_use]
pub fn mean_sd_text(mean: f64, std_dev: f64) -> String {
    format!("{mean:.1} ± {std_dev:.1}")
}

/// `[min - max]` with one decimal
#[must_use]
pub fn range_text(min: f64, max: f64) -> String {
    format!("[{min:.1} - {max:.1}]")
}

/// Fraction rendered as a percentage with one decimal
#[must_use]
pub fn percentage_text(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// `mean ± sd` of a summary
#[must_use]
pub fn summary_text(summary: &Summary) -> String {
    mean_sd_text(summary.mean, summary.std_dev)
}
