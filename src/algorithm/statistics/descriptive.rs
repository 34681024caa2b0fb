//! Descriptive statistics over a single column

use std::hash::Hash;

use itertools::{Itertools, MinMaxResult};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{CardioError, Result};

/// Summary of a continuous column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of values
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// 2.5th percentile
    pub p2_5: f64,
    /// 97.5th percentile
    pub p97_5: f64,
}

fn require_values(statistic: &'static str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(CardioError::insufficient_data(statistic, "empty sample"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CardioError::insufficient_data(statistic, "sample contains non-finite values"));
    }
    Ok(())
}

/// Arithmetic mean
///
/// # Errors
/// Returns `InsufficientData` for an empty or non-finite sample.
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Result<f64> {
    require_values("mean", values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divisor `n`)
///
/// # Errors
/// Returns `InsufficientData` for an empty or non-finite sample.
#[allow(clippy::cast_precision_loss)]
pub fn std_dev(values: &[f64]) -> Result<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / values.len() as f64).sqrt())
}

/// Smallest and largest value
///
/// # Errors
/// Returns `InsufficientData` for an empty or non-finite sample.
pub fn min_max(values: &[f64]) -> Result<(f64, f64)> {
    require_values("range", values)?;
    match values.iter().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::OneElement(v) => Ok((*v, *v)),
        MinMaxResult::MinMax(lo, hi) => Ok((*lo, *hi)),
        MinMaxResult::NoElements => Err(CardioError::insufficient_data("range", "empty sample")),
    }
}

/// Percentile `q ∈ [0, 100]` with linear interpolation between order statistics
///
/// # Errors
/// Returns `InsufficientData` for an empty sample and `InvalidInput` when
/// `q` is outside `[0, 100]`.
pub fn percentile(values: &[f64], q: f64) -> Result<f64> {
    require_values("percentile", values)?;
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    percentile_sorted(&sorted, q)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile_sorted(sorted: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(CardioError::invalid_input("percentile", format!("{q} is outside [0, 100]")));
    }
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - pos.floor();
    Ok((sorted[upper] - sorted[lower]).mul_add(frac, sorted[lower]))
}

/// Count, mean, SD, range and the central 95% interval
///
/// # Errors
/// Returns `InsufficientData` for an empty or non-finite sample.
pub fn summarize(values: &[f64]) -> Result<Summary> {
    require_values("summary", values)?;
    let sorted = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();

    Ok(Summary {
        count: values.len(),
        mean: mean(values)?,
        std_dev: std_dev(values)?,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p2_5: percentile_sorted(&sorted, 2.5)?,
        p97_5: percentile_sorted(&sorted, 97.5)?,
    })
}

/// Occurrences of each distinct value
pub fn value_counts<K, I>(values: I) -> FxHashMap<K, usize>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut counts = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

/// Count and relative frequency of each modality, in the given order
///
/// Modalities absent from `counts` get a zero count.
#[allow(clippy::cast_precision_loss)]
pub fn frequencies<'a>(
    counts: &FxHashMap<String, usize>,
    modalities: impl IntoIterator<Item = &'a str>,
) -> Vec<(String, usize, f64)> {
    let total: usize = counts.values().sum();
    modalities
        .into_iter()
        .map(|m| {
            let n = counts.get(m).copied().unwrap_or(0);
            let freq = if total == 0 { 0.0 } else { n as f64 / total as f64 };
            (m.to_string(), n, freq)
        })
        .collect()
}
