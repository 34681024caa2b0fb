//! Support-vector machine inference
//!
//! Loads a fitted binary SVC exported as JSON (support vectors, dual
//! coefficients, intercept, kernel parameters) and evaluates its decision
//! function. Training happens elsewhere; this module only predicts.
//!
//! The decision function follows scikit-learn's binary convention:
//! `f(x) = Σ dual_coef_i · K(sv_i, x) + intercept`, and the predicted class
//! is `classes[1]` when `f(x) > 0`, otherwise `classes[0]`.

use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::error::{CardioError, Result};
use crate::models::FEATURE_COUNT;

/// Binary risk label produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLabel {
    /// 0: no cardiovascular disease predicted
    Low = 0,
    /// 1: cardiovascular disease predicted
    Elevated = 1,
}

impl RiskLabel {
    /// Convert a class label
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Low),
            1 => Some(Self::Elevated),
            _ => None,
        }
    }

    /// Class label as emitted by the model
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Short narrative for the presentation layer
    #[must_use]
    pub const fn narrative(self) -> &'static str {
        match self {
            Self::Low => "Low risk: the model does not predict a cardiovascular disease.",
            Self::Elevated => {
                "Elevated risk: the model predicts a cardiovascular disease. \
                 Please consult a physician."
            }
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("low risk"),
            Self::Elevated => f.write_str("elevated risk"),
        }
    }
}

/// Binary classifier over the scaled feature vector
pub trait RiskClassifier: Debug + Send + Sync {
    /// Signed distance to the decision boundary
    fn decision_function(&self, features: &[f64; FEATURE_COUNT]) -> f64;

    /// Predicted label
    fn predict(&self, features: &[f64; FEATURE_COUNT]) -> RiskLabel {
        if self.decision_function(features) > 0.0 {
            RiskLabel::Elevated
        } else {
            RiskLabel::Low
        }
    }
}

/// SVM kernel with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kernel {
    /// `x · y`
    Linear,
    /// `(gamma · x·y + coef0)^degree`
    Poly {
        /// Kernel coefficient
        gamma: f64,
        /// Independent term
        coef0: f64,
        /// Polynomial degree
        degree: u32,
    },
    /// `exp(-gamma · ||x - y||²)`
    Rbf {
        /// Kernel coefficient
        gamma: f64,
    },
    /// `tanh(gamma · x·y + coef0)`
    Sigmoid {
        /// Kernel coefficient
        gamma: f64,
        /// Independent term
        coef0: f64,
    },
}

impl Kernel {
    /// Evaluate the kernel for two vectors
    #[must_use]
    pub fn evaluate(&self, x: &[f64], y: &[f64]) -> f64 {
        match *self {
            Self::Linear => dot(x, y),
            Self::Poly {
                gamma,
                coef0,
                degree,
            } => gamma
                .mul_add(dot(x, y), coef0)
                .powi(i32::try_from(degree).unwrap_or(i32::MAX)),
            Self::Rbf { gamma } => {
                let sq_dist: f64 = x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum();
                (-gamma * sq_dist).exp()
            }
            Self::Sigmoid { gamma, coef0 } => gamma.mul_add(dot(x, y), coef0).tanh(),
        }
    }
}

fn dot(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}

/// Portable export of a fitted binary SVC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmExport {
    /// Kernel and its parameters
    pub kernel: Kernel,
    /// Support vectors, one row per vector
    pub support_vectors: Vec<Vec<f64>>,
    /// Dual coefficients (`y_i · alpha_i`), one per support vector
    pub dual_coef: Vec<f64>,
    /// Intercept of the decision function
    pub intercept: f64,
    /// The two class labels, negative class first
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

const fn default_classes() -> [i64; 2] {
    [0, 1]
}

#[derive(Debug, Clone, PartialEq)]
enum Decision {
    /// Linear kernels collapse into one weight vector
    Linear { weights: [f64; FEATURE_COUNT] },
    Kernel {
        kernel: Kernel,
        support_vectors: Vec<[f64; FEATURE_COUNT]>,
        dual_coef: Vec<f64>,
    },
}

/// Fitted support-vector classifier
#[derive(Debug, Clone, PartialEq)]
pub struct SvmClassifier {
    decision: Decision,
    intercept: f64,
    n_support: usize,
}

impl SvmClassifier {
    /// Validate an export and build the classifier
    ///
    /// # Errors
    /// Returns `InvalidArtifact` when the support vectors do not have seven
    /// columns, the coefficient count does not match, a value is not finite,
    /// the kernel parameters are invalid, or the classes are not `[0, 1]`.
    pub fn from_export(export: SvmExport) -> Result<Self> {
        if export.classes != [0, 1] {
            return Err(CardioError::invalid_artifact(
                "classifier",
                format!("expected classes [0, 1], got {:?}", export.classes),
            ));
        }
        if export.support_vectors.is_empty() {
            return Err(CardioError::invalid_artifact("classifier", "no support vectors"));
        }
        if export.support_vectors.len() != export.dual_coef.len() {
            return Err(CardioError::invalid_artifact(
                "classifier",
                format!(
                    "{} support vectors but {} dual coefficients",
                    export.support_vectors.len(),
                    export.dual_coef.len()
                ),
            ));
        }
        match export.kernel {
            Kernel::Rbf { gamma } | Kernel::Poly { gamma, .. } | Kernel::Sigmoid { gamma, .. }
                if !(gamma.is_finite() && gamma > 0.0) =>
            {
                return Err(CardioError::invalid_artifact(
                    "classifier",
                    format!("gamma must be positive, got {gamma}"),
                ));
            }
            _ => {}
        }
        if !export.intercept.is_finite() || export.dual_coef.iter().any(|c| !c.is_finite()) {
            return Err(CardioError::invalid_artifact(
                "classifier",
                "non-finite coefficient",
            ));
        }

        let support_vectors = export
            .support_vectors
            .iter()
            .enumerate()
            .map(|(i, row)| -> Result<[f64; FEATURE_COUNT]> {
                let sv: [f64; FEATURE_COUNT] = row.as_slice().try_into().map_err(|_| {
                    CardioError::invalid_artifact(
                        "classifier",
                        format!(
                            "support vector {i} has {} columns, expected {FEATURE_COUNT}",
                            row.len()
                        ),
                    )
                })?;
                Ok(sv)
            })
            .collect::<Result<Vec<_>>>()?;

        let n_support = support_vectors.len();
        let decision = match export.kernel {
            Kernel::Linear => {
                let mut weights = [0.0; FEATURE_COUNT];
                for (sv, coef) in support_vectors.iter().zip(&export.dual_coef) {
                    for (w, x) in weights.iter_mut().zip(sv) {
                        *w = coef.mul_add(*x, *w);
                    }
                }
                Decision::Linear { weights }
            }
            kernel => Decision::Kernel {
                kernel,
                support_vectors,
                dual_coef: export.dual_coef,
            },
        };

        Ok(Self {
            decision,
            intercept: export.intercept,
            n_support,
        })
    }

    /// Number of support vectors in the fitted model
    #[must_use]
    pub const fn n_support(&self) -> usize {
        self.n_support
    }
}

impl RiskClassifier for SvmClassifier {
    fn decision_function(&self, features: &[f64; FEATURE_COUNT]) -> f64 {
        let sum = match &self.decision {
            Decision::Linear { weights } => dot(weights, features),
            Decision::Kernel {
                kernel,
                support_vectors,
                dual_coef,
            } => support_vectors
                .iter()
                .zip(dual_coef)
                .map(|(sv, coef)| coef * kernel.evaluate(sv, features))
                .sum(),
        };
        sum + self.intercept
    }
}
