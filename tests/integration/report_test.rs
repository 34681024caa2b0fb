use std::fmt::Write;

use cardio_risk::report::parameter::{AGE, AP_AHA, BMI, CHOLESTEROL, LIFESTYLE, SMOKE};
use cardio_risk::report::{
    CATALOGUE, GroupDescription, categorical_row, compare_by_cardio, continuous_row,
    find_parameter, format_pvalue, generate_summary,
};
use cardio_risk::{CleaningConfig, Result, load_cohort};

use crate::utils::write_dataset;

/// Cleaned-format cohort where subjects with the outcome are older and
/// have higher systolic pressure
fn synthetic_cohort() -> String {
    let mut csv = String::from("age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio\n");
    for i in 0..80u32 {
        let cardio = i % 2;
        let age = 40 + (i % 13) + 8 * cardio;
        let sex = if i % 3 == 0 { "male" } else { "female" };
        let height = 150 + (i % 30);
        let weight = 55 + (i % 35);
        let ap_hi = 110 + (i % 20) + 25 * cardio;
        let ap_lo = 70 + (i % 15);
        let cholesterol = 1 + (i % 3);
        let gluc = 1 + (i % 5).min(2);
        let smoke = u32::from(i % 8 < 2);
        let alco = u32::from(i % 7 == 0);
        let active = u32::from(i % 5 != 0);
        writeln!(
            csv,
            "{age},{sex},{height},{weight},{ap_hi},{ap_lo},{cholesterol},{gluc},{smoke},{alco},{active},{cardio}"
        )
        .unwrap();
    }
    csv
}

fn load() -> Result<cardio_risk::Cohort> {
    let dir = tempfile::tempdir()?;
    let path = write_dataset(dir.path(), "cardio_clean.csv", &synthetic_cohort())?;
    load_cohort(&path, 0, &CleaningConfig::default())
}

#[test]
fn test_catalogue_covers_cohort_columns() {
    assert_eq!(CATALOGUE.len(), 17);
    assert_eq!(find_parameter("ap_m").map(|p| p.label()).as_deref(), Some("Mean Blood Pressure (mmHg)"));
    assert_eq!(LIFESTYLE.modalities().len(), 8);
    assert_eq!(AP_AHA.modalities()[3].1, "Hypertension stage II");
}

#[test]
fn test_continuous_and_categorical_rows() -> Result<()> {
    let cohort = load()?;
    assert_eq!(cohort.records.len(), 80);

    let bmi = continuous_row(&cohort.records, &BMI)?;
    assert_eq!(bmi.summary.count, 80);
    assert!(bmi.summary.p2_5 <= bmi.summary.p97_5);
    assert!(bmi.summary.min <= bmi.summary.p2_5);

    let cholesterol = categorical_row(&cohort.records, &CHOLESTEROL)?;
    let counts: Vec<usize> = cholesterol.shares.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![27, 27, 26]);
    let total: f64 = cholesterol.shares.iter().map(|s| s.share).sum();
    assert!((total - 1.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_outcome_comparison() -> Result<()> {
    let cohort = load()?;

    let age = compare_by_cardio(&cohort.records, &AGE)?;
    assert!(age.p_value < 1e-4);
    assert_eq!(format_pvalue(age.p_value), "p < 10⁻⁴");
    let (GroupDescription::Continuous(without), GroupDescription::Continuous(with)) =
        (&age.without_disease, &age.with_disease)
    else {
        panic!("age should be summarized as a continuous parameter");
    };
    assert!(with.mean > without.mean);

    let smoke = compare_by_cardio(&cohort.records, &SMOKE)?;
    assert!(smoke.p_value > 0.05);
    Ok(())
}

#[test]
fn test_generate_summary() -> Result<()> {
    let cohort = load()?;
    let text = generate_summary(&cohort);

    assert!(text.starts_with("Cohort Summary:"));
    assert!(text.contains("Subjects: 80"));
    assert!(text.contains("With cardiovascular disease: 40"));
    assert!(text.contains("Systolic Blood Pressure (mmHg)"));
    assert!(text.contains("Non-smoker, No alcohol, Active"));
    assert!(text.contains("Comparison by cardiovascular disease"));
    assert!(text.contains(" ± "));
    Ok(())
}
