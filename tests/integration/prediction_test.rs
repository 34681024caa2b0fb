use std::sync::Arc;

use cardio_risk::algorithm::advisory::{Advisory, PressureKind};
use cardio_risk::algorithm::prediction::{CLASSIFIER_FILE, ModelBundle, PredictionPipeline, RiskLabel};
use cardio_risk::models::{compute_bmi, compute_mean_arterial_pressure};
use cardio_risk::{CardioError, Result, SubjectInput, SubjectRecord};

use crate::utils::{write_linear_model, write_rbf_model};

fn subject(pairs: &[(&str, &str)]) -> Result<SubjectRecord> {
    SubjectInput::from_pairs(pairs.iter().copied()).parse()
}

const TYPICAL: [(&str, &str); 7] = [
    ("age", "50"),
    ("weight", "70"),
    ("height", "170"),
    ("ap_hi", "120"),
    ("ap_lo", "80"),
    ("cholesterol", "1"),
    ("gluc", "1"),
];

#[test]
fn test_derived_features() -> Result<()> {
    assert!((compute_bmi(70.0, 170.0)? - 24.2).abs() < 1e-9);
    assert!((compute_mean_arterial_pressure(120.0, 80.0) - 93.3).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_typical_subject_end_to_end() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_rbf_model(dir.path())?)?;

    let record = subject(&TYPICAL)?;
    let assessment = pipeline.assess(&record)?;

    assert!((assessment.bmi - 24.2).abs() < 1e-9);
    assert!((assessment.mean_arterial_pressure - 93.3).abs() < 1e-9);
    assert!(matches!(assessment.label, RiskLabel::Low | RiskLabel::Elevated));
    assert!(assessment.advisories.is_empty());
    Ok(())
}

#[test]
fn test_out_of_range_subject_gets_advisories_and_label() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_rbf_model(dir.path())?)?;

    let record = subject(&[
        ("age", "30"),
        ("weight", "70"),
        ("height", "170"),
        ("ap_hi", "45"),
        ("ap_lo", "100"),
        ("cholesterol", "2"),
        ("gluc", "3"),
    ])?;
    let assessment = pipeline.assess(&record)?;

    assert_eq!(
        assessment.advisories.as_slice(),
        &[
            Advisory::AgeOutsideTrainingRange,
            Advisory::ImplausiblyLowPressure {
                pressure: PressureKind::Systolic
            },
            Advisory::InconsistentBloodPressure,
        ]
    );
    assert!(matches!(assessment.label, RiskLabel::Low | RiskLabel::Elevated));
    Ok(())
}

#[test]
fn test_young_subject_is_still_labelled() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_linear_model(dir.path())?)?;

    let mut pairs = TYPICAL;
    pairs[0] = ("age", "20");
    let assessment = pipeline.assess(&subject(&pairs)?)?;

    assert_eq!(assessment.label, RiskLabel::Low);
    assert_eq!(assessment.advisories.as_slice(), &[Advisory::AgeOutsideTrainingRange]);
    assert!(assessment.render_text().contains("trained age range"));
    Ok(())
}

#[test]
fn test_prediction_is_deterministic() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_rbf_model(dir.path())?)?;
    let record = subject(&TYPICAL)?;

    let first = pipeline.predict(&record)?;
    let second = pipeline.predict(&record)?;
    assert_eq!(first, second);
    assert_eq!(pipeline.decision_value(&record)?, pipeline.decision_value(&record)?);
    Ok(())
}

#[test]
fn test_every_valid_category_is_accepted() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_rbf_model(dir.path())?)?;

    for cholesterol in 1..=3 {
        for gluc in 1..=3 {
            let record = SubjectRecord::new(50, 70.0, 170.0, 120.0, 80.0, cholesterol, gluc)?;
            pipeline.predict(&record)?;
        }
    }
    Ok(())
}

#[test]
fn test_unknown_category_is_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_rbf_model(dir.path())?)?;

    let bad_cholesterol = SubjectRecord::new(50, 70.0, 170.0, 120.0, 80.0, 4, 1)?;
    assert!(matches!(
        pipeline.predict(&bad_cholesterol),
        Err(CardioError::InvalidCategory {
            field: "cholesterol",
            value: 4
        })
    ));

    let bad_gluc = SubjectRecord::new(50, 70.0, 170.0, 120.0, 80.0, 1, 0)?;
    let err = pipeline.assess(&bad_gluc).unwrap_err();
    assert!(err.is_request_error());
    Ok(())
}

#[test]
fn test_linear_model_labels() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = PredictionPipeline::from_model_dir(&write_linear_model(dir.path())?)?;

    let normal = SubjectRecord::new(50, 70.0, 170.0, 120.0, 80.0, 1, 1)?;
    let hypertensive = SubjectRecord::new(50, 70.0, 170.0, 180.0, 110.0, 1, 1)?;
    assert_eq!(pipeline.predict(&normal)?, RiskLabel::Low);
    assert_eq!(pipeline.predict(&hypertensive)?, RiskLabel::Elevated);
    Ok(())
}

#[test]
fn test_missing_field_is_invalid_input() {
    let pairs = &TYPICAL[..6];
    assert!(matches!(
        subject(pairs),
        Err(CardioError::InvalidInput { field: "gluc", .. })
    ));
}

#[test]
fn test_missing_artifact_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_rbf_model(dir.path())?;
    std::fs::remove_file(dir.path().join(CLASSIFIER_FILE))?;

    let err = ModelBundle::load(dir.path()).unwrap_err();
    assert!(matches!(err, CardioError::ModelArtifactMissing { .. }));
    assert!(!err.is_request_error());
    Ok(())
}

#[tokio::test]
async fn test_async_bundle_matches_sync_bundle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_rbf_model(dir.path())?;

    let sync = PredictionPipeline::new(Arc::new(ModelBundle::load(dir.path())?));
    let from_async = PredictionPipeline::new(Arc::new(ModelBundle::load_async(dir.path()).await?));

    let record = SubjectRecord::new(58, 92.0, 165.0, 150.0, 95.0, 3, 2)?;
    assert_eq!(sync.predict(&record)?, from_async.predict(&record)?);
    Ok(())
}
