//! Reference distributions for the test p-values, backed by `statrs`

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

use crate::error::{CardioError, Result};

/// The standard normal distribution `N(0, 1)`
///
/// # Errors
/// Only fails if `statrs` rejects the parameters.
pub fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| CardioError::distribution("normal", e))
}

/// Standard normal upper tail `1 - Φ(z)`
///
/// # Errors
/// See [`standard_normal`].
pub fn normal_sf(z: f64) -> Result<f64> {
    Ok(standard_normal()?.sf(z))
}

/// Upper tail of the chi-square distribution
///
/// # Errors
/// Returns `Distribution` for a non-positive number of degrees of freedom.
pub fn chi2_sf(statistic: f64, dof: f64) -> Result<f64> {
    if statistic <= 0.0 {
        return Ok(1.0);
    }
    let chi2 = ChiSquared::new(dof).map_err(|e| CardioError::distribution("chi-square", e))?;
    Ok(chi2.sf(statistic))
}

/// Two-sided p-value of Student's t distribution
///
/// # Errors
/// Returns `Distribution` for a non-positive number of degrees of freedom.
pub fn student_t_two_sided(t: f64, dof: f64) -> Result<f64> {
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, dof).map_err(|e| CardioError::distribution("Student's t", e))?;
    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_relative(actual: f64, expected: f64, tolerance: f64) {
        let error = ((actual - expected) / expected).abs();
        assert!(error < tolerance, "{actual} vs {expected} (relative error {error:e})");
    }

    #[test]
    fn test_normal_tails_match_reference() {
        // scipy.stats.norm.sf
        assert_relative(normal_sf(1.0).unwrap(), 0.158_655_253_931_457_05, 1e-12);
        assert_relative(normal_sf(4.0).unwrap(), 3.167_124_183_311_992e-5, 1e-12);
        assert_relative(normal_sf(6.0).unwrap(), 9.865_876_450_376_946e-10, 1e-10);
        assert!((normal_sf(0.0).unwrap() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_normal_quantiles() {
        let normal = standard_normal().unwrap();
        assert!((normal.inverse_cdf(0.975) - 1.959_963_984_540_054).abs() < 1e-12);
        assert!((normal.inverse_cdf(0.01) + 2.326_347_874_040_841).abs() < 1e-12);
        assert!(normal.inverse_cdf(0.5).abs() < 1e-12);
    }

    #[test]
    fn test_chi2_survival() {
        // 2 dof: sf(x) = exp(-x/2)
        let expected = (-8.0_f64 / 3.0).exp();
        assert_relative(chi2_sf(16.0 / 3.0, 2.0).unwrap(), expected, 1e-12);
        assert!((chi2_sf(3.841_458_820_694_124, 1.0).unwrap() - 0.05).abs() < 1e-10);
        assert!((chi2_sf(0.0, 3.0).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(chi2_sf(1.0, 0.0).is_err());
    }

    #[test]
    fn test_student_t_tails() {
        // t = 2.776 with 4 dof is the 97.5% quantile
        assert!((student_t_two_sided(2.776_445_105_197_799, 4.0).unwrap() - 0.05).abs() < 1e-10);
        assert!((student_t_two_sided(-2.776_445_105_197_799, 4.0).unwrap() - 0.05).abs() < 1e-10);
        assert!((student_t_two_sided(0.0, 10.0).unwrap() - 1.0).abs() < 1e-12);
        assert!(student_t_two_sided(f64::INFINITY, 10.0).unwrap().abs() < f64::EPSILON);
    }
}
