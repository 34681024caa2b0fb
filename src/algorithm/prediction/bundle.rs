//! Model artifact bundle
//!
//! The encoder, scaler and classifier are loaded once at startup from a model
//! directory and shared read-only for the lifetime of the process. Loading
//! failures are fatal: the service cannot serve predictions without them.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use serde::de::DeserializeOwned;

use crate::error::util::{safe_read_to_string, validate_directory};
use crate::error::{CardioError, Result};
use crate::models::FEATURE_NAMES;
use crate::utils::logging::{log_operation_complete, log_operation_start};

use super::classifier::{RiskClassifier, SvmClassifier, SvmExport};
use super::encoder::{CategoryEncoder, LabelEncoder};
use super::scaler::{FeatureScaler, MinMaxScaler, MinMaxScalerExport};

/// File name of the label encoder export
pub const ENCODER_FILE: &str = "encoder.json";
/// File name of the scaler export
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the classifier export
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Frozen encoder, scaler and classifier
pub struct ModelBundle {
    encoder: Box<dyn CategoryEncoder>,
    scaler: Box<dyn FeatureScaler>,
    classifier: Box<dyn RiskClassifier>,
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("encoder", &self.encoder)
            .field("scaler", &self.scaler)
            .field("classifier", &self.classifier)
            .finish()
    }
}

impl ModelBundle {
    /// Assemble a bundle from already constructed components
    ///
    /// # Errors
    /// Returns `InvalidArtifact` if the scaler records column names that differ
    /// from the training order.
    pub fn new(
        encoder: impl CategoryEncoder + 'static,
        scaler: impl FeatureScaler + 'static,
        classifier: impl RiskClassifier + 'static,
    ) -> Result<Self> {
        if let Some(names) = scaler.feature_names() {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
                return Err(CardioError::invalid_artifact(
                    "scaler",
                    format!("fitted on columns {names:?}, expected {FEATURE_NAMES:?}"),
                ));
            }
        }

        Ok(Self {
            encoder: Box::new(encoder),
            scaler: Box::new(scaler),
            classifier: Box::new(classifier),
        })
    }

    /// Load the three JSON exports from a model directory
    ///
    /// # Errors
    /// Returns `ModelArtifactMissing` if a file is absent or cannot be
    /// deserialized, and `InvalidArtifact` if its content is inconsistent.
    pub fn load(dir: &Path) -> Result<Self> {
        let start = Instant::now();
        log_operation_start("Loading model artifacts from", dir);
        check_model_dir(dir)?;

        let encoder: LabelEncoder = read_artifact(dir, "encoder", ENCODER_FILE)?;
        let scaler: MinMaxScalerExport = read_artifact(dir, "scaler", SCALER_FILE)?;
        let classifier: SvmExport = read_artifact(dir, "classifier", CLASSIFIER_FILE)?;

        let bundle = Self::from_exports(encoder, scaler, classifier)?;
        log_operation_complete("loaded", dir, 3, Some(start.elapsed()));
        Ok(bundle)
    }

    /// Load the three JSON exports concurrently
    ///
    /// # Errors
    /// Same conditions as [`ModelBundle::load`].
    pub async fn load_async(dir: &Path) -> Result<Self> {
        let start = Instant::now();
        log_operation_start("Loading model artifacts asynchronously from", dir);
        check_model_dir(dir)?;

        let (encoder, scaler, classifier) = futures::try_join!(
            read_artifact_async::<LabelEncoder>(dir, "encoder", ENCODER_FILE),
            read_artifact_async::<MinMaxScalerExport>(dir, "scaler", SCALER_FILE),
            read_artifact_async::<SvmExport>(dir, "classifier", CLASSIFIER_FILE),
        )?;

        let bundle = Self::from_exports(encoder, scaler, classifier)?;
        log_operation_complete("loaded", dir, 3, Some(start.elapsed()));
        Ok(bundle)
    }

    fn from_exports(
        encoder: LabelEncoder,
        scaler: MinMaxScalerExport,
        classifier: SvmExport,
    ) -> Result<Self> {
        encoder.validate()?;
        let scaler = MinMaxScaler::from_export(scaler)?;
        let classifier = SvmClassifier::from_export(classifier)?;
        log::debug!(
            "Encoder classes {:?}, classifier with {} support vectors",
            encoder.classes(),
            classifier.n_support()
        );
        Self::new(encoder, scaler, classifier)
    }

    /// Shared categorical encoder
    #[must_use]
    pub fn encoder(&self) -> &dyn CategoryEncoder {
        self.encoder.as_ref()
    }

    /// Feature scaler
    #[must_use]
    pub fn scaler(&self) -> &dyn FeatureScaler {
        self.scaler.as_ref()
    }

    /// Binary classifier
    #[must_use]
    pub fn classifier(&self) -> &dyn RiskClassifier {
        self.classifier.as_ref()
    }
}

fn check_model_dir(dir: &Path) -> Result<()> {
    validate_directory(dir, "model artifacts")
        .map_err(|e| CardioError::artifact_missing("model directory", dir, e))
}

fn read_artifact<T: DeserializeOwned>(dir: &Path, artifact: &'static str, file: &str) -> Result<T> {
    let path = dir.join(file);
    let content = safe_read_to_string(&path, artifact)
        .map_err(|e| CardioError::artifact_missing(artifact, &path, e))?;
    serde_json::from_str(&content).map_err(|e| CardioError::artifact_missing(artifact, &path, e))
}

async fn read_artifact_async<T: DeserializeOwned>(
    dir: &Path,
    artifact: &'static str,
    file: &str,
) -> Result<T> {
    let path = dir.join(file);
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| CardioError::artifact_missing(artifact, &path, e))?;
    serde_json::from_str(&content).map_err(|e| CardioError::artifact_missing(artifact, &path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_artifacts(dir: &Path) {
        fs::write(dir.join(ENCODER_FILE), r#"{"classes": [1, 2, 3]}"#).unwrap();
        fs::write(
            dir.join(SCALER_FILE),
            r#"{
                "feature_names": ["age", "ap_hi", "ap_lo", "cholesterol", "gluc", "bmi", "ap_m"],
                "data_min": [30, 60, 40, 0, 0, 15, 50],
                "data_max": [65, 240, 190, 2, 2, 50, 200]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.join(CLASSIFIER_FILE),
            r#"{
                "kernel": {"type": "linear"},
                "support_vectors": [[1, 1, 1, 0, 0, 0, 1]],
                "dual_coef": [1.0],
                "intercept": -1.5
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let bundle = ModelBundle::load(dir.path()).unwrap();
        assert!(bundle.encoder().encode("cholesterol", 2).is_ok());
        assert!(bundle.scaler().feature_names().is_some());
    }

    #[test]
    fn test_missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        fs::remove_file(dir.path().join(SCALER_FILE)).unwrap();

        let err = ModelBundle::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            CardioError::ModelArtifactMissing { artifact: "scaler", .. }
        ));
        assert!(!err.is_request_error());
    }

    #[test]
    fn test_undeserializable_artifact_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(CLASSIFIER_FILE), "not json").unwrap();
        assert!(matches!(
            ModelBundle::load(dir.path()),
            Err(CardioError::ModelArtifactMissing { artifact: "classifier", .. })
        ));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelBundle::load(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(
            err,
            CardioError::ModelArtifactMissing { artifact: "model directory", .. }
        ));
    }

    #[tokio::test]
    async fn test_load_async_matches_sync() {
        let dir = tempfile::tempdir().unwrap();
        write_artifacts(dir.path());
        let bundle = ModelBundle::load_async(dir.path()).await.unwrap();
        let features = [0.5; crate::models::FEATURE_COUNT];
        let sync = ModelBundle::load(dir.path()).unwrap();
        assert!(
            (bundle.classifier().decision_function(&features)
                - sync.classifier().decision_function(&features))
            .abs()
                < f64::EPSILON
        );
    }
}
