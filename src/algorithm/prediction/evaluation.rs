//! Scoring a cohort against its recorded outcome
//!
//! Besides the confusion matrix, the per-class report follows the usual
//! classification report layout: precision, recall, F1 and support for each
//! class, then macro and support-weighted averages.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DEFAULT_BATCH_SIZE;
use crate::models::CohortRecord;
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar};

use super::classifier::RiskLabel;
use super::pipeline::PredictionPipeline;

/// Classes in report order
pub const CLASSES: [RiskLabel; 2] = [RiskLabel::Low, RiskLabel::Elevated];

/// Precision, recall and F1 for one class or an average over classes
///
/// A metric is `None` when its denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClassMetrics {
    /// Share of predictions of the class that were right
    pub precision: Option<f64>,
    /// Share of the class that was predicted as such
    pub recall: Option<f64>,
    /// Harmonic mean of precision and recall
    pub f1: Option<f64>,
}

/// Confusion matrix of predicted label versus recorded `cardio`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Predicted elevated, recorded disease
    pub true_positive: usize,
    /// Predicted low, no recorded disease
    pub true_negative: usize,
    /// Predicted elevated, no recorded disease
    pub false_positive: usize,
    /// Predicted low, recorded disease
    pub false_negative: usize,
    /// Rows the pipeline rejected (unknown category codes)
    pub rejected: usize,
}

impl ConfusionMatrix {
    /// Count one scored row
    pub fn record(&mut self, predicted: RiskLabel, actual: bool) {
        match (predicted, actual) {
            (RiskLabel::Elevated, true) => self.true_positive += 1,
            (RiskLabel::Low, false) => self.true_negative += 1,
            (RiskLabel::Elevated, false) => self.false_positive += 1,
            (RiskLabel::Low, true) => self.false_negative += 1,
        }
    }

    /// Add another matrix into this one
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            true_positive: self.true_positive + other.true_positive,
            true_negative: self.true_negative + other.true_negative,
            false_positive: self.false_positive + other.false_positive,
            false_negative: self.false_negative + other.false_negative,
            rejected: self.rejected + other.rejected,
        }
    }

    /// Rows that received a label
    #[must_use]
    pub const fn scored(&self) -> usize {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }

    /// Fraction of correct labels, `None` when nothing was scored
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.scored())
    }

    /// True-positive rate
    #[must_use]
    pub fn sensitivity(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }

    /// True-negative rate
    #[must_use]
    pub fn specificity(&self) -> Option<f64> {
        ratio(self.true_negative, self.true_negative + self.false_positive)
    }

    /// Correct predictions, all predictions and recorded rows of a class
    const fn class_counts(&self, class: RiskLabel) -> (usize, usize, usize) {
        match class {
            RiskLabel::Elevated => (
                self.true_positive,
                self.true_positive + self.false_positive,
                self.true_positive + self.false_negative,
            ),
            RiskLabel::Low => (
                self.true_negative,
                self.true_negative + self.false_negative,
                self.true_negative + self.false_positive,
            ),
        }
    }

    /// Rows whose recorded outcome is the class
    #[must_use]
    pub const fn support(&self, class: RiskLabel) -> usize {
        self.class_counts(class).2
    }

    /// Share of rows predicted as the class that belong to it
    #[must_use]
    pub fn precision(&self, class: RiskLabel) -> Option<f64> {
        let (correct, predicted, _) = self.class_counts(class);
        ratio(correct, predicted)
    }

    /// Share of rows of the class that were predicted as such
    #[must_use]
    pub fn recall(&self, class: RiskLabel) -> Option<f64> {
        let (correct, _, support) = self.class_counts(class);
        ratio(correct, support)
    }

    /// F1 score of the class
    #[must_use]
    pub fn f1(&self, class: RiskLabel) -> Option<f64> {
        let (precision, recall) = (self.precision(class)?, self.recall(class)?);
        if precision + recall == 0.0 {
            return Some(0.0);
        }
        Some(2.0 * precision * recall / (precision + recall))
    }

    /// All metrics of one class
    #[must_use]
    pub fn class_metrics(&self, class: RiskLabel) -> ClassMetrics {
        ClassMetrics {
            precision: self.precision(class),
            recall: self.recall(class),
            f1: self.f1(class),
        }
    }

    /// Unweighted mean over both classes
    ///
    /// Undefined class metrics count as zero; `None` when nothing was scored.
    #[must_use]
    pub fn macro_avg(&self) -> ClassMetrics {
        self.average(|_| 1.0)
    }

    /// Mean over both classes weighted by support
    ///
    /// Undefined class metrics count as zero; `None` when nothing was scored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_avg(&self) -> ClassMetrics {
        self.average(|class| self.support(class) as f64)
    }

    fn average(&self, weight: impl Fn(RiskLabel) -> f64) -> ClassMetrics {
        let total: f64 = CLASSES.iter().map(|&c| weight(c)).sum();
        if self.scored() == 0 || total <= 0.0 {
            return ClassMetrics::default();
        }
        let mean = |metric: fn(&Self, RiskLabel) -> Option<f64>| {
            let sum: f64 = CLASSES
                .iter()
                .map(|&c| metric(self, c).unwrap_or(0.0) * weight(c))
                .sum();
            Some(sum / total)
        };
        ClassMetrics {
            precision: mean(Self::precision),
            recall: mean(Self::recall),
            f1: mean(Self::f1),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(num: usize, den: usize) -> Option<f64> {
    (den > 0).then(|| num as f64 / den as f64)
}

fn pct(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn report_row(label: &str, metrics: ClassMetrics, support: usize) -> String {
    format!(
        "  {:<18} {:>10} {:>10} {:>10} {:>8}\n",
        label,
        pct(metrics.precision),
        pct(metrics.recall),
        pct(metrics.f1),
        support
    )
}

impl ConfusionMatrix {
    /// Per-class classification report as an aligned text table
    #[must_use]
    pub fn classification_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!(
            "  {:<18} {:>10} {:>10} {:>10} {:>8}\n",
            "Class", "Precision", "Recall", "F1", "Support"
        ));
        report.push_str(&format!("  {}\n", "-".repeat(60)));
        for class in CLASSES {
            let label = format!("{} ({})", class.code(), class);
            report.push_str(&report_row(&label, self.class_metrics(class), self.support(class)));
        }
        report.push_str(&report_row("Macro average", self.macro_avg(), self.scored()));
        report.push_str(&report_row("Weighted average", self.weighted_avg(), self.scored()));
        report
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model evaluation:")?;
        writeln!(f, "  Scored rows: {}", self.scored())?;
        writeln!(f, "  Rejected rows: {}", self.rejected)?;
        writeln!(
            f,
            "  TP: {}  TN: {}  FP: {}  FN: {}",
            self.true_positive, self.true_negative, self.false_positive, self.false_negative
        )?;
        writeln!(f, "  Accuracy: {}", pct(self.accuracy()))?;
        writeln!(f, "  Sensitivity: {}", pct(self.sensitivity()))?;
        writeln!(f, "  Specificity: {}", pct(self.specificity()))?;
        writeln!(f)?;
        write!(f, "{}", self.classification_report().trim_end())
    }
}

/// Score every cohort row and compare with the recorded outcome
///
/// Rows are processed in chunks of `batch_size` on the rayon pool. Rows the
/// pipeline rejects are counted, not fatal.
#[must_use]
pub fn evaluate_cohort(
    pipeline: &PredictionPipeline,
    cohort: &[CohortRecord],
    batch_size: usize,
) -> ConfusionMatrix {
    let batch_size = if batch_size == 0 {
        DEFAULT_BATCH_SIZE
    } else {
        batch_size
    };
    let pb = create_main_progress_bar(cohort.len() as u64, Some("Scoring cohort"));

    let matrix = cohort
        .par_chunks(batch_size)
        .map(|chunk| {
            let mut local = ConfusionMatrix::default();
            for record in chunk {
                match pipeline.predict(&record.to_subject()) {
                    Ok(label) => local.record(label, record.cardio),
                    Err(e) => {
                        log::debug!("Row {} not scored: {e}", record.id);
                        local.rejected += 1;
                    }
                }
            }
            pb.inc(chunk.len() as u64);
            local
        })
        .reduce(ConfusionMatrix::default, ConfusionMatrix::merge);

    finish_progress_bar(&pb, Some("Scoring complete"));
    if matrix.rejected > 0 {
        log::warn!("{} cohort rows could not be scored", matrix.rejected);
    }
    matrix
}
