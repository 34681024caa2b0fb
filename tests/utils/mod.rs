use std::path::{Path, PathBuf};

use cardio_risk::Result;
use cardio_risk::algorithm::prediction::{CLASSIFIER_FILE, ENCODER_FILE, SCALER_FILE};

/// Training minima in feature order: age, `ap_hi`, `ap_lo`, cholesterol, gluc, bmi, `ap_m`
pub const DATA_MIN: [f64; 7] = [30.0, 60.0, 40.0, 0.0, 0.0, 15.0, 50.0];
/// Training maxima in feature order
pub const DATA_MAX: [f64; 7] = [65.0, 240.0, 190.0, 2.0, 2.0, 50.0, 200.0];

/// Raw export with five valid rows and two that the cleaning rules drop
pub const RAW_EXPORT: &str = "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio
0;18393;2;168;62.0;110;80;1;1;0;0;1;0
1;20228;1;156;85.0;140;90;3;1;0;0;1;1
2;18857;1;165;64.0;160;70;3;1;0;0;0;1
3;17623;2;169;82.0;170;100;1;1;0;0;1;1
4;17474;1;156;56.0;100;60;1;1;0;0;0;0
5;21914;1;151;67.0;-120;80;2;2;0;0;0;0
6;22113;1;157;93.0;14;9;1;1;0;0;1;1
";

fn write_json(dir: &Path, file: &str, content: &str) -> Result<()> {
    std::fs::write(dir.join(file), content)?;
    Ok(())
}

fn scaler_json() -> String {
    format!(
        r#"{{
    "feature_names": ["age", "ap_hi", "ap_lo", "cholesterol", "gluc", "bmi", "ap_m"],
    "data_min": {DATA_MIN:?},
    "data_max": {DATA_MAX:?},
    "feature_range": [0.0, 1.0]
}}"#
    )
}

/// Write a model whose decision is `scaled ap_hi - 0.5`
///
/// Systolic pressures above 150 mmHg are labelled elevated.
pub fn write_linear_model(dir: &Path) -> Result<PathBuf> {
    write_json(dir, ENCODER_FILE, r#"{"classes": [1, 2, 3]}"#)?;
    write_json(dir, SCALER_FILE, &scaler_json())?;
    write_json(
        dir,
        CLASSIFIER_FILE,
        r#"{
    "kernel": {"type": "linear"},
    "support_vectors": [[0, 1, 0, 0, 0, 0, 0]],
    "dual_coef": [1.0],
    "intercept": -0.5,
    "classes": [0, 1]
}"#,
    )?;
    Ok(dir.to_path_buf())
}

/// Write an RBF model with two support vectors, one per class
pub fn write_rbf_model(dir: &Path) -> Result<PathBuf> {
    write_json(dir, ENCODER_FILE, r#"{"classes": [1, 2, 3]}"#)?;
    write_json(dir, SCALER_FILE, &scaler_json())?;
    write_json(
        dir,
        CLASSIFIER_FILE,
        r#"{
    "kernel": {"type": "rbf", "gamma": 0.5},
    "support_vectors": [
        [0.5, 0.3, 0.27, 0.0, 0.0, 0.26, 0.29],
        [0.8, 0.6, 0.4, 1.0, 1.0, 0.5, 0.5]
    ],
    "dual_coef": [-1.0, 1.0],
    "intercept": 0.0
}"#,
    )?;
    Ok(dir.to_path_buf())
}

/// Write `content` to `name` inside `dir`
pub fn write_dataset(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}
