//! Configuration for prediction and cohort analysis.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CardioError, Result};
use crate::error::util::safe_read_to_string;

/// Default batch size for reading cohort files
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Thresholds for the non-blocking advisory rules
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    /// Youngest age (years) seen during training
    pub min_trained_age: u32,
    /// Oldest age (years) seen during training
    pub max_trained_age: u32,
    /// Blood pressures (mmHg) below this are likely entered in cmHg
    pub min_plausible_pressure: f64,
    /// Heights (cm) below this are likely entered in meters
    pub min_plausible_height: f64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            min_trained_age: 39,
            max_trained_age: 65,
            min_plausible_pressure: 50.0,
            min_plausible_height: 50.0,
        }
    }
}

/// Cut-offs applied when cleaning a raw cohort export
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Youngest accepted age in years; younger subjects are age outliers
    pub min_age: f64,
    /// Lowest accepted systolic pressure (mmHg)
    pub min_systolic: f64,
    /// Highest accepted systolic pressure (mmHg)
    pub max_systolic: f64,
    /// Lowest accepted diastolic pressure (mmHg)
    pub min_diastolic: f64,
    /// Highest accepted diastolic pressure (mmHg)
    pub max_diastolic: f64,
    /// Swap systolic and diastolic when they were entered in the wrong column
    pub swap_inverted_pressures: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            min_age: 32.0,
            min_systolic: 60.0,
            max_systolic: 300.0,
            min_diastolic: 40.0,
            max_diastolic: 250.0,
            swap_inverted_pressures: true,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardioConfig {
    /// Directory holding `encoder.json`, `scaler.json` and `classifier.json`
    pub model_dir: PathBuf,
    /// Cohort dataset used for reports and evaluation
    pub dataset: Option<PathBuf>,
    /// Batch size for reading cohort files
    pub batch_size: usize,
    /// Advisory thresholds
    pub advisories: AdvisoryThresholds,
    /// Cleaning cut-offs
    pub cleaning: CleaningConfig,
}

impl Default for CardioConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            dataset: None,
            batch_size: DEFAULT_BATCH_SIZE,
            advisories: AdvisoryThresholds::default(),
            cleaning: CleaningConfig::default(),
        }
    }
}

impl CardioConfig {
    /// Read a configuration file, falling back to defaults for absent keys
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = safe_read_to_string(path, "configuration")?;
        serde_json::from_str(&content)
            .map_err(|e| CardioError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply `CARDIO_MODEL_DIR`, `CARDIO_DATASET` and `CARDIO_BATCH_SIZE`
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CARDIO_MODEL_DIR") {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(dataset) = lookup("CARDIO_DATASET") {
            self.dataset = Some(PathBuf::from(dataset));
        }
        if let Some(size) = lookup("CARDIO_BATCH_SIZE") {
            match size.parse::<usize>() {
                Ok(size) if size > 0 => self.batch_size = size,
                _ => log::warn!("Ignoring invalid CARDIO_BATCH_SIZE: {size}"),
            }
        }
        self
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// Returns an error if a range is empty or the batch size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(CardioError::Config("batch_size must be positive".into()));
        }
        if self.advisories.min_trained_age > self.advisories.max_trained_age {
            return Err(CardioError::Config(
                "min_trained_age is greater than max_trained_age".into(),
            ));
        }
        if self.cleaning.min_systolic >= self.cleaning.max_systolic
            || self.cleaning.min_diastolic >= self.cleaning.max_diastolic
        {
            return Err(CardioError::Config("empty blood pressure cut-off range".into()));
        }
        if !self.cleaning.min_age.is_finite() || self.cleaning.min_age < 0.0 {
            return Err(CardioError::Config("min_age must be a non-negative number".into()));
        }
        Ok(())
    }
}

impl fmt::Display for CardioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  Model Directory: {}", self.model_dir.display())?;
        if let Some(dataset) = &self.dataset {
            writeln!(f, "  Dataset: {}", dataset.display())?;
        }
        writeln!(f, "  Batch Size: {}", self.batch_size)?;
        writeln!(
            f,
            "  Trained Age Range: [{}, {}]",
            self.advisories.min_trained_age, self.advisories.max_trained_age
        )?;
        writeln!(f, "  Minimum Cohort Age: {}", self.cleaning.min_age)?;
        writeln!(
            f,
            "  Systolic Cut-offs: [{}, {}]",
            self.cleaning.min_systolic, self.cleaning.max_systolic
        )?;
        writeln!(
            f,
            "  Diastolic Cut-offs: [{}, {}]",
            self.cleaning.min_diastolic, self.cleaning.max_diastolic
        )
    }
}
