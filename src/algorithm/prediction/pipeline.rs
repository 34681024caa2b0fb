//! Prediction pipeline
//!
//! Turns a subject record into a binary risk label with the frozen model
//! bundle: encode the two categorical columns, rescale the seven features in
//! training order, classify. The pipeline is stateless; the bundle is shared
//! read-only, so one pipeline can serve concurrent requests.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use crate::algorithm::advisory::{Advisories, evaluate_advisories};
use crate::config::AdvisoryThresholds;
use crate::error::Result;
use crate::models::{FEATURE_COUNT, FeatureVector, SubjectRecord};

use super::bundle::ModelBundle;
use super::classifier::RiskLabel;

/// Prediction and advisories for one subject
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    /// Body-mass index used as model input
    pub bmi: f64,
    /// Mean arterial pressure used as model input
    pub mean_arterial_pressure: f64,
    /// Predicted label
    pub label: RiskLabel,
    /// Non-blocking warnings
    pub advisories: Advisories,
}

impl Assessment {
    /// Narrative for the label followed by one line per advisory
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut text = format!(
            "BMI: {:.1} kg/m²\nMean arterial pressure: {:.1} mmHg\n{}\n",
            self.bmi,
            self.mean_arterial_pressure,
            self.label.narrative()
        );
        for advisory in &self.advisories {
            text.push_str("  - ");
            text.push_str(&advisory.message());
            text.push('\n');
        }
        text
    }
}

/// Encoder → scaler → classifier over a shared model bundle
#[derive(Debug, Clone)]
pub struct PredictionPipeline {
    bundle: Arc<ModelBundle>,
    thresholds: AdvisoryThresholds,
}

impl PredictionPipeline {
    /// Create a pipeline over an already loaded bundle
    #[must_use]
    pub fn new(bundle: Arc<ModelBundle>) -> Self {
        Self {
            bundle,
            thresholds: AdvisoryThresholds::default(),
        }
    }

    /// Load the bundle from a model directory and create a pipeline
    ///
    /// # Errors
    /// Returns `ModelArtifactMissing` or `InvalidArtifact` when the bundle
    /// cannot be loaded.
    pub fn from_model_dir(dir: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(ModelBundle::load(dir)?)))
    }

    /// Use custom advisory thresholds
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: AdvisoryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The shared bundle
    #[must_use]
    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    /// Step 1: assemble the named feature vector, encoding the categories
    ///
    /// # Errors
    /// Returns `InvalidCategory` when cholesterol or glucose has no mapping.
    pub fn encode(&self, subject: &SubjectRecord) -> Result<FeatureVector> {
        let encoder = self.bundle.encoder();
        Ok(FeatureVector {
            age: f64::from(subject.age),
            ap_hi: subject.systolic_pressure,
            ap_lo: subject.diastolic_pressure,
            cholesterol: encoder.encode("cholesterol", subject.cholesterol)?,
            gluc: encoder.encode("gluc", subject.glucose)?,
            bmi: subject.bmi,
            ap_m: subject.mean_arterial_pressure,
        })
    }

    /// Steps 1 and 2: encoded and rescaled model input
    ///
    /// # Errors
    /// Returns `InvalidCategory` when cholesterol or glucose has no mapping.
    pub fn scaled_features(&self, subject: &SubjectRecord) -> Result<[f64; FEATURE_COUNT]> {
        let features = self.encode(subject)?;
        Ok(self.bundle.scaler().scale(&features))
    }

    /// Signed classifier margin for a subject
    ///
    /// # Errors
    /// Returns `InvalidCategory` when cholesterol or glucose has no mapping.
    pub fn decision_value(&self, subject: &SubjectRecord) -> Result<f64> {
        let scaled = self.scaled_features(subject)?;
        Ok(self.bundle.classifier().decision_function(&scaled))
    }

    /// Predict the risk label for a subject
    ///
    /// # Errors
    /// Returns `InvalidCategory` when cholesterol or glucose has no mapping.
    pub fn predict(&self, subject: &SubjectRecord) -> Result<RiskLabel> {
        let scaled = self.scaled_features(subject)?;
        let label = self.bundle.classifier().predict(&scaled);
        log::debug!("Predicted {label} for subject aged {}", subject.age);
        Ok(label)
    }

    /// Predict and attach advisories
    ///
    /// Advisories never prevent the prediction.
    ///
    /// # Errors
    /// Returns `InvalidCategory` when cholesterol or glucose has no mapping.
    pub fn assess(&self, subject: &SubjectRecord) -> Result<Assessment> {
        let advisories = evaluate_advisories(subject, &self.thresholds);
        for advisory in &advisories {
            log::info!("Advisory for prediction request: {}", advisory.tag());
        }

        Ok(Assessment {
            bmi: subject.bmi,
            mean_arterial_pressure: subject.mean_arterial_pressure,
            label: self.predict(subject)?,
            advisories,
        })
    }

    /// Predict many subjects in parallel, keeping input order
    #[must_use]
    pub fn predict_batch(&self, subjects: &[SubjectRecord]) -> Vec<Result<RiskLabel>> {
        subjects
            .par_iter()
            .map(|subject| self.predict(subject))
            .collect()
    }
}
