use std::sync::Arc;

use cardio_risk::algorithm::prediction::{ModelBundle, PredictionPipeline, RiskLabel, evaluate_cohort};
use cardio_risk::models::{BloodPressureCategory, DAYS_PER_YEAR, Lifestyle, Sex};
use cardio_risk::{CleaningConfig, Result, load_cohort, load_cohort_async, write_cohort_parquet};

use crate::utils::{RAW_EXPORT, write_dataset, write_linear_model};

#[test]
fn test_raw_export_is_cleaned_and_derived() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_dataset(dir.path(), "cardio_train.csv", RAW_EXPORT)?;

    let cohort = load_cohort(&path, 0, &CleaningConfig::default())?;
    let report = cohort.report;
    assert_eq!(report.total_rows, 7);
    assert_eq!(report.non_positive_pressure, 1);
    assert_eq!(report.systolic_out_of_range, 1);
    assert_eq!(report.kept, 5);

    let first = &cohort.records[0];
    assert_eq!(first.id, 0);
    assert_eq!(first.sex, Sex::Male);
    assert!((first.age - 18393.0 / DAYS_PER_YEAR).abs() < 1e-9);
    assert!((first.bmi - 22.0).abs() < 1e-9);
    assert_eq!(first.ap_aha, BloodPressureCategory::HypertensionStage1);
    assert_eq!(first.lifestyle, Lifestyle::Healthy);
    assert!(first.healthy_ls);

    let inactive = &cohort.records[2];
    assert_eq!(inactive.lifestyle, Lifestyle::NotActive);
    assert_eq!(inactive.ap_aha, BloodPressureCategory::HypertensionStage2);
    Ok(())
}

#[test]
fn test_stricter_cut_offs_drop_more_rows() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_dataset(dir.path(), "cardio_train.csv", RAW_EXPORT)?;
    let config = CleaningConfig {
        max_systolic: 150.0,
        ..CleaningConfig::default()
    };

    let cohort = load_cohort(&path, 0, &config)?;
    assert_eq!(cohort.report.systolic_out_of_range, 3);
    assert_eq!(cohort.records.len(), 3);
    Ok(())
}

#[test]
fn test_young_subjects_dropped_after_day_conversion() -> Result<()> {
    let export = "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio
0;10798;1;160;60.0;120;80;1;1;0;0;1;0
1;20228;1;156;85.0;140;90;3;1;0;0;1;1
";
    let dir = tempfile::tempdir()?;
    let path = write_dataset(dir.path(), "cardio_train.csv", export)?;

    let cohort = load_cohort(&path, 0, &CleaningConfig::default())?;
    assert_eq!(cohort.report.age_out_of_range, 1);
    assert_eq!(cohort.records.len(), 1);
    assert_eq!(cohort.records[0].id, 1);
    assert!(cohort.records.iter().all(|r| r.age >= 32.0));
    Ok(())
}

#[tokio::test]
async fn test_parquet_export_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let csv = write_dataset(dir.path(), "cardio_train.csv", RAW_EXPORT)?;
    let parquet = dir.path().join("cardio_clean.parquet");

    let cohort = load_cohort_async(&csv, 2, &CleaningConfig::default()).await?;
    assert_eq!(write_cohort_parquet(&parquet, &cohort.records)?, 5);

    let reloaded = load_cohort_async(&parquet, 0, &CleaningConfig::default()).await?;
    assert_eq!(reloaded.report.dropped(), 0);
    assert_eq!(reloaded.records.len(), cohort.records.len());
    for (a, b) in cohort.records.iter().zip(&reloaded.records) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.sex, b.sex);
        assert!((a.age - b.age).abs() < 1e-9);
        assert_eq!(a.lifestyle, b.lifestyle);
    }
    Ok(())
}

#[test]
fn test_evaluate_cohort_confusion_matrix() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_dataset(dir.path(), "cardio_train.csv", RAW_EXPORT)?;
    let model_dir = dir.path().join("model");
    std::fs::create_dir(&model_dir)?;
    write_linear_model(&model_dir)?;

    let cohort = load_cohort(&path, 0, &CleaningConfig::default())?;
    let pipeline = PredictionPipeline::new(Arc::new(ModelBundle::load(&model_dir)?));

    // Elevated above 150 mmHg systolic: rows 2 and 3 are true positives,
    // row 1 (140 mmHg) is a false negative
    let matrix = evaluate_cohort(&pipeline, &cohort.records, 2);
    assert_eq!(matrix.true_positive, 2);
    assert_eq!(matrix.false_negative, 1);
    assert_eq!(matrix.true_negative, 2);
    assert_eq!(matrix.false_positive, 0);
    assert_eq!(matrix.rejected, 0);
    assert!((matrix.accuracy().unwrap_or_default() - 0.8).abs() < 1e-12);

    // Low: precision 2/3, recall 1; elevated: precision 1, recall 2/3
    assert_eq!(matrix.support(RiskLabel::Low), 2);
    assert_eq!(matrix.support(RiskLabel::Elevated), 3);
    assert!((matrix.precision(RiskLabel::Elevated).unwrap_or_default() - 1.0).abs() < 1e-12);
    assert!((matrix.recall(RiskLabel::Low).unwrap_or_default() - 1.0).abs() < 1e-12);
    assert!((matrix.f1(RiskLabel::Low).unwrap_or_default() - 0.8).abs() < 1e-12);
    assert!((matrix.f1(RiskLabel::Elevated).unwrap_or_default() - 0.8).abs() < 1e-12);
    assert!((matrix.weighted_avg().f1.unwrap_or_default() - 0.8).abs() < 1e-12);
    assert!(matrix.to_string().contains("Weighted average"));
    Ok(())
}
