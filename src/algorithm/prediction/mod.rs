//! Risk prediction
//!
//! Frozen model artifacts (label encoder, min-max scaler, SVM) and the
//! pipeline that chains them over a subject record.

pub mod bundle;
pub mod classifier;
pub mod encoder;
pub mod evaluation;
pub mod pipeline;
pub mod scaler;

pub use bundle::{CLASSIFIER_FILE, ENCODER_FILE, ModelBundle, SCALER_FILE};
pub use classifier::{Kernel, RiskClassifier, RiskLabel, SvmClassifier, SvmExport};
pub use encoder::{CategoryEncoder, LabelEncoder};
pub use evaluation::{CLASSES, ClassMetrics, ConfusionMatrix, evaluate_cohort};
pub use pipeline::{Assessment, PredictionPipeline};
pub use scaler::{FeatureScaler, MinMaxScaler, MinMaxScalerExport};
