//! Hypothesis tests used by the cohort reports
//!
//! Results agree with SciPy's defaults: `shapiro`, `mannwhitneyu`
//! (two-sided, asymptotic, continuity corrected), `chi2_contingency`
//! (Yates-corrected for 2x2 tables) and `spearmanr`.

use itertools::Itertools;
use serde::Serialize;
use statrs::distribution::ContinuousCDF;

use crate::error::{CardioError, Result};

use super::distributions::{chi2_sf, normal_sf, standard_normal, student_t_two_sided};

/// Largest sample the Shapiro-Wilk approximation is calibrated for
pub const SHAPIRO_MAX_N: usize = 5000;

/// Test statistic and its p-value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    /// Value of the test statistic
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Chi-square test of independence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyResult {
    /// Chi-square statistic
    pub statistic: f64,
    /// p-value
    pub p_value: f64,
    /// Degrees of freedom
    pub dof: usize,
    /// Expected frequencies under independence
    pub expected: Vec<Vec<f64>>,
}

fn poly(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc.mul_add(x, c))
}

/// Shapiro-Wilk normality test (Royston's approximation)
///
/// # Errors
/// Returns `InsufficientData` for fewer than three values, non-finite values
/// or a constant sample.
#[allow(clippy::cast_precision_loss, clippy::many_single_char_names)]
pub fn shapiro_wilk(values: &[f64]) -> Result<TestResult> {
    const C1: [f64; 6] = [0.0, 0.221_157, -0.147_981, -2.071_190, 4.434_685, -2.706_056];
    const C2: [f64; 6] = [0.0, 0.042_981, -0.293_762, -1.752_461, 5.682_633, -3.582_633];
    const C3: [f64; 4] = [0.544, -0.399_78, 0.025_054, -6.714e-4];
    const C4: [f64; 4] = [1.3822, -0.778_57, 0.062_767, -0.002_032_2];
    const C5: [f64; 4] = [-1.5861, -0.310_82, -0.083_751, 0.003_891_5];
    const C6: [f64; 3] = [-0.4803, -0.082_676, 0.003_030_2];
    const G: [f64; 2] = [-2.273, 0.459];

    let n = values.len();
    if n < 3 {
        return Err(CardioError::insufficient_data("Shapiro-Wilk", "need at least 3 values"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CardioError::insufficient_data("Shapiro-Wilk", "non-finite values"));
    }
    if n > SHAPIRO_MAX_N {
        log::warn!("Shapiro-Wilk p-value may be inaccurate for n = {n} > {SHAPIRO_MAX_N}");
    }

    let x = values.iter().copied().sorted_by(f64::total_cmp).collect_vec();
    let range = x[n - 1] - x[0];
    if range <= 0.0 {
        return Err(CardioError::insufficient_data("Shapiro-Wilk", "all values are identical"));
    }

    let an = n as f64;
    let mut a = vec![0.0; n];
    if n == 3 {
        a[0] = -std::f64::consts::FRAC_1_SQRT_2;
        a[2] = std::f64::consts::FRAC_1_SQRT_2;
    } else {
        let normal = standard_normal()?;
        let m = (1..=n)
            .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (an + 0.25)))
            .collect_vec();
        let summ2: f64 = m.iter().map(|v| v * v).sum();
        let ssumm2 = summ2.sqrt();
        let rsn = 1.0 / an.sqrt();

        let a_n = poly(&C1, rsn) + m[n - 1] / ssumm2;
        a[n - 1] = a_n;
        a[0] = -a_n;

        let (first, phi) = if n > 5 {
            let a_n1 = poly(&C2, rsn) + m[n - 2] / ssumm2;
            a[n - 2] = a_n1;
            a[1] = -a_n1;
            let phi = (summ2 - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
                / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
            (2, phi)
        } else {
            let phi = (summ2 - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
            (1, phi)
        };
        let sqrt_phi = phi.sqrt();
        for i in first..n - first {
            a[i] = m[i] / sqrt_phi;
        }
    }

    let mean = x.iter().sum::<f64>() / an;
    let ssq: f64 = x.iter().map(|v| (v - mean) * (v - mean)).sum();
    let numerator: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let w = (numerator * numerator / ssq).min(1.0);

    let p_value = if n == 3 {
        const PI6: f64 = 6.0 / std::f64::consts::PI;
        const STQR: f64 = std::f64::consts::FRAC_PI_3;
        (PI6 * (w.sqrt().asin() - STQR)).clamp(0.0, 1.0)
    } else {
        let w1 = (1.0 - w).ln();
        if n <= 11 {
            let gamma = poly(&G, an);
            if w1 >= gamma {
                0.0
            } else {
                let y = -(gamma - w1).ln();
                let m = poly(&C3, an);
                let s = poly(&C4, an).exp();
                normal_sf((y - m) / s)?
            }
        } else {
            let xx = an.ln();
            let m = poly(&C5, xx);
            let s = poly(&C6, xx).exp();
            normal_sf((w1 - m) / s)?
        }
    };

    Ok(TestResult {
        statistic: w,
        p_value,
    })
}

/// Average ranks (1-based); ties share the mean of their positions
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn rank_average(values: &[f64]) -> Vec<f64> {
    let order = (0..values.len())
        .sorted_by(|&i, &j| values[i].total_cmp(&values[j]))
        .collect_vec();
    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        start = end;
    }
    ranks
}

/// Sizes of tied groups among the values
fn tie_sizes(values: &[f64]) -> Vec<usize> {
    values
        .iter()
        .copied()
        .sorted_by(f64::total_cmp)
        .chunk_by(|v| v.to_bits())
        .into_iter()
        .map(|(_, group)| group.count())
        .filter(|&t| t > 1)
        .collect()
}

/// Two-sided Mann-Whitney U test
///
/// Normal approximation with tie correction and continuity correction.
/// The statistic is `U` of the first sample.
///
/// # Errors
/// Returns `InsufficientData` when a sample is empty or all values are tied.
#[allow(clippy::cast_precision_loss)]
pub fn mann_whitney_u(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.is_empty() || y.is_empty() {
        return Err(CardioError::insufficient_data("Mann-Whitney U", "empty sample"));
    }
    let n1 = x.len() as f64;
    let n2 = y.len() as f64;
    let pooled = x.iter().chain(y).copied().collect_vec();
    let ranks = rank_average(&pooled);

    let r1: f64 = ranks[..x.len()].iter().sum();
    let u1 = n1.mul_add(-(n1 + 1.0) / 2.0, r1);
    let u2 = n1.mul_add(n2, -u1);

    let n = n1 + n2;
    let tie_term: f64 = tie_sizes(&pooled)
        .into_iter()
        .map(|t| {
            let t = t as f64;
            t * t * t - t
        })
        .sum();
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(CardioError::insufficient_data("Mann-Whitney U", "all values are tied"));
    }

    let mu = n1 * n2 / 2.0;
    let z = (u1.max(u2) - mu - 0.5) / variance.sqrt();
    Ok(TestResult {
        statistic: u1,
        p_value: (2.0 * normal_sf(z)?).clamp(0.0, 1.0),
    })
}

/// Chi-square test of independence on a contingency table
///
/// Tables with one degree of freedom get Yates' continuity correction.
///
/// # Errors
/// Returns `InsufficientData` for ragged tables, tables smaller than 2x2, or
/// rows and columns whose total is zero.
#[allow(clippy::cast_precision_loss)]
pub fn chi2_contingency(observed: &[Vec<usize>]) -> Result<ContingencyResult> {
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows < 2 || cols < 2 {
        return Err(CardioError::insufficient_data("chi-square", "table smaller than 2x2"));
    }
    if observed.iter().any(|r| r.len() != cols) {
        return Err(CardioError::insufficient_data("chi-square", "rows differ in length"));
    }

    let row_totals = observed.iter().map(|r| r.iter().sum::<usize>()).collect_vec();
    let col_totals = (0..cols)
        .map(|j| observed.iter().map(|r| r[j]).sum::<usize>())
        .collect_vec();
    if row_totals.contains(&0) || col_totals.contains(&0) {
        return Err(CardioError::insufficient_data(
            "chi-square",
            "a row or column has no observations",
        ));
    }
    let total = row_totals.iter().sum::<usize>() as f64;

    let expected = row_totals
        .iter()
        .map(|&r| {
            col_totals
                .iter()
                .map(|&c| r as f64 * c as f64 / total)
                .collect_vec()
        })
        .collect_vec();

    let dof = (rows - 1) * (cols - 1);
    let statistic: f64 = observed
        .iter()
        .zip(&expected)
        .flat_map(|(o_row, e_row)| o_row.iter().zip(e_row))
        .map(|(&o, &e)| {
            let mut diff = (o as f64 - e).abs();
            if dof == 1 {
                diff = (diff - 0.5).max(0.0);
            }
            diff * diff / e
        })
        .sum();

    Ok(ContingencyResult {
        statistic,
        p_value: chi2_sf(statistic, dof as f64)?,
        dof,
        expected,
    })
}

/// Spearman rank correlation with a two-sided t-distribution p-value
///
/// # Errors
/// Returns `InsufficientData` for mismatched lengths, fewer than three
/// pairs, or a constant column.
#[allow(clippy::cast_precision_loss)]
pub fn spearman(x: &[f64], y: &[f64]) -> Result<TestResult> {
    if x.len() != y.len() {
        return Err(CardioError::insufficient_data("Spearman", "samples differ in length"));
    }
    if x.len() < 3 {
        return Err(CardioError::insufficient_data("Spearman", "need at least 3 pairs"));
    }

    let rx = rank_average(x);
    let ry = rank_average(y);
    let n = x.len() as f64;
    let mx = rx.iter().sum::<f64>() / n;
    let my = ry.iter().sum::<f64>() / n;

    let (sxy, sxx, syy) = rx.iter().zip(&ry).fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (a, b)| {
        let (da, db) = (a - mx, b - my);
        (da.mul_add(db, sxy), da.mul_add(da, sxx), db.mul_add(db, syy))
    });
    if sxx == 0.0 || syy == 0.0 {
        return Err(CardioError::insufficient_data("Spearman", "constant column"));
    }

    let rho = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    let dof = n - 2.0;
    let p_value = if (1.0 - rho.abs()) < f64::EPSILON {
        0.0
    } else {
        let t = rho * (dof / rho.mul_add(-rho, 1.0)).sqrt();
        student_t_two_sided(t, dof)?
    };

    Ok(TestResult {
        statistic: rho,
        p_value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_average_ties() {
        assert_eq!(rank_average(&[5.0, 6.0, 7.0, 8.0, 7.0]), vec![1.0, 2.0, 3.5, 5.0, 3.5]);
    }

    #[test]
    fn test_shapiro_three_equally_spaced() {
        let r = shapiro_wilk(&[1.0, 2.0, 3.0]).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shapiro_normal_quantiles_look_normal() {
        let n = 50;
        let normal = standard_normal().unwrap();
        let sample: Vec<f64> = (1..=n)
            .map(|i| normal.inverse_cdf(f64::from(i) / f64::from(n + 1)))
            .collect();
        let r = shapiro_wilk(&sample).unwrap();
        assert!(r.statistic > 0.98, "W = {}", r.statistic);
        assert!(r.p_value > 0.5, "p = {}", r.p_value);
    }

    #[test]
    fn test_shapiro_skewed_sample_rejected() {
        let sample = [1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 5.0, 10.0, 50.0];
        let r = shapiro_wilk(&sample).unwrap();
        assert!(r.statistic < 0.7);
        assert!(r.p_value < 0.01);
    }

    #[test]
    fn test_shapiro_small_sample_reference() {
        let sample = [
            148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0,
        ];
        let r = shapiro_wilk(&sample).unwrap();
        assert!((r.statistic - 0.788_81).abs() < 1e-4, "W = {}", r.statistic);
        assert!((r.p_value - 0.006_704).abs() < 1e-4, "p = {}", r.p_value);
    }

    #[test]
    fn test_shapiro_degenerate() {
        assert!(shapiro_wilk(&[1.0, 2.0]).is_err());
        assert!(shapiro_wilk(&[4.0; 10]).is_err());
    }

    #[test]
    fn test_mann_whitney_separated_samples() {
        let r = mann_whitney_u(&[1.0, 2.0, 3.0, 4.0, 5.0], &[6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
        assert!(r.statistic.abs() < 1e-12);
        // scipy.stats.mannwhitneyu(..., method="asymptotic").pvalue
        assert!((r.p_value - 0.012_185_7).abs() < 1e-5, "p = {}", r.p_value);
    }

    #[test]
    fn test_mann_whitney_identical_samples() {
        let r = mann_whitney_u(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert!((r.p_value - 1.0).abs() < 1e-12);
        assert!(mann_whitney_u(&[1.0, 1.0], &[1.0]).is_err());
    }

    #[test]
    fn test_chi2_yates_on_2x2() {
        let r = chi2_contingency(&[vec![10, 20], vec![20, 10]]).unwrap();
        assert_eq!(r.dof, 1);
        assert!((r.statistic - 5.4).abs() < 1e-12);
        assert!((r.p_value - 0.020_136_75).abs() < 1e-7, "p = {}", r.p_value);
    }

    #[test]
    fn test_chi2_larger_table() {
        let r = chi2_contingency(&[vec![10, 10], vec![10, 10], vec![10, 30]]).unwrap();
        assert_eq!(r.dof, 2);
        assert!((r.statistic - 16.0 / 3.0).abs() < 1e-12);
        assert!((r.p_value - (-8.0f64 / 3.0).exp()).abs() < 1e-9);
        assert!((r.expected[2][1] - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_chi2_degenerate_tables() {
        assert!(chi2_contingency(&[vec![1, 2]]).is_err());
        assert!(chi2_contingency(&[vec![0, 0], vec![3, 4]]).is_err());
        assert!(chi2_contingency(&[vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn test_spearman_matches_reference() {
        let r = spearman(&[1.0, 2.0, 3.0, 4.0, 5.0], &[5.0, 6.0, 7.0, 8.0, 7.0]).unwrap();
        assert!((r.statistic - 0.820_782_681_668_123_3).abs() < 1e-12);
        assert!((r.p_value - 0.088_587_005_313_543_81).abs() < 1e-7, "p = {}", r.p_value);
    }

    #[test]
    fn test_spearman_perfect_and_degenerate() {
        let r = spearman(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert!((r.statistic - 1.0).abs() < 1e-12);
        assert!(r.p_value.abs() < f64::EPSILON);
        assert!(spearman(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).is_err());
        assert!(spearman(&[1.0, 2.0], &[1.0, 2.0]).is_err());
    }
}
