//! Advisory rules for prediction requests
//!
//! Advisories flag inputs that fall outside the range seen during training
//! or that look like unit mistakes. They never block a prediction; the
//! presentation layer decides how to render them.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use crate::config::AdvisoryThresholds;
use crate::models::SubjectRecord;

/// Which blood pressure reading an advisory refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureKind {
    /// Systolic (`ap_hi`)
    Systolic,
    /// Diastolic (`ap_lo`)
    Diastolic,
}

impl fmt::Display for PressureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Systolic => f.write_str("systolic"),
            Self::Diastolic => f.write_str("diastolic"),
        }
    }
}

/// Non-blocking warning attached to a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// Age outside the trained range; accuracy may be reduced
    AgeOutsideTrainingRange,
    /// A pressure reading is implausibly low, probably entered in cmHg
    ImplausiblyLowPressure {
        /// The offending reading
        pressure: PressureKind,
    },
    /// Diastolic pressure is not lower than systolic pressure
    InconsistentBloodPressure,
    /// Height is implausibly low, probably not in cm
    HeightUnits,
}

impl Advisory {
    /// Stable tag for the presentation layer
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::AgeOutsideTrainingRange => "age_outside_training_range",
            Self::ImplausiblyLowPressure { .. } => "implausibly_low_pressure",
            Self::InconsistentBloodPressure => "inconsistent_blood_pressure",
            Self::HeightUnits => "height_units",
        }
    }

    /// User-facing message
    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::AgeOutsideTrainingRange => {
                "Reduced accuracy outside trained age range: the prediction may lose accuracy \
                 for this age."
                    .to_string()
            }
            Self::ImplausiblyLowPressure { pressure } => format!(
                "The {pressure} blood pressure value appears implausibly low, please recheck \
                 that it is given in mmHg (120/80 mmHg is 12/8 cmHg)."
            ),
            Self::InconsistentBloodPressure => {
                "Inconsistent blood pressure values: systolic blood pressure is expected to be \
                 higher than diastolic blood pressure."
                    .to_string()
            }
            Self::HeightUnits => "Please check units: height must be given in cm.".to_string(),
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Advisories for one subject; rarely more than a handful
pub type Advisories = SmallVec<[Advisory; 4]>;

/// Evaluate all advisory rules for a subject
///
/// The result is ordered: age, systolic, diastolic, consistency, height.
#[must_use]
pub fn evaluate_advisories(subject: &SubjectRecord, thresholds: &AdvisoryThresholds) -> Advisories {
    let mut advisories = Advisories::new();

    if !(thresholds.min_trained_age..=thresholds.max_trained_age).contains(&subject.age) {
        advisories.push(Advisory::AgeOutsideTrainingRange);
    }

    if subject.systolic_pressure < thresholds.min_plausible_pressure {
        advisories.push(Advisory::ImplausiblyLowPressure {
            pressure: PressureKind::Systolic,
        });
    }

    if subject.diastolic_pressure < thresholds.min_plausible_pressure {
        advisories.push(Advisory::ImplausiblyLowPressure {
            pressure: PressureKind::Diastolic,
        });
    }

    if subject.diastolic_pressure >= subject.systolic_pressure {
        advisories.push(Advisory::InconsistentBloodPressure);
    }

    if subject.height < thresholds.min_plausible_height {
        advisories.push(Advisory::HeightUnits);
    }

    advisories
}
