//! Reading cohort datasets
//!
//! Supported inputs:
//! - the raw export (`;`-separated, `gender` coded 1/2, age in days),
//! - the cleaned cohort (`,`-separated CSV with a `sex` column),
//! - Parquet files written by [`writer::write_cohort_parquet`].
//!
//! Columns are matched by name, so column order does not matter.

pub mod cleaning;
pub mod columns;
pub mod writer;

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::{CleaningConfig, DEFAULT_BATCH_SIZE};
use crate::error::Result;
use crate::error::util::safe_open_file;
use crate::models::{CohortRecord, age_from_days};
use crate::utils::logging::{log_operation_complete, log_operation_start};

pub use cleaning::{CleaningReport, RawCohortRow, clean_cohort};
pub use columns::{downcast_array, float_values, get_column, sex_values};
pub use writer::write_cohort_parquet;

/// Ages above this are taken to be in days
pub const MAX_AGE_IN_YEARS: f64 = 150.0;

/// Cleaned cohort with the cleaning report
#[derive(Debug, Clone)]
pub struct Cohort {
    /// Kept rows with derived columns
    pub records: Vec<CohortRecord>,
    /// Effect of the cleaning rules
    pub report: CleaningReport,
}

/// Get the batch size from the environment, if set
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("CARDIO_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&n| n > 0)
}

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

/// Pick `;` or `,` from whichever is more frequent in the header line
fn sniff_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Read a CSV file into record batches, inferring the schema
///
/// # Errors
/// Returns an IO error if the file cannot be opened or an Arrow error if it
/// cannot be parsed.
pub fn read_csv(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let mut file = safe_open_file(path, "cohort CSV")?;

    let mut header = String::new();
    BufReader::new(&mut file).read_line(&mut header)?;
    let delimiter = sniff_delimiter(&header);
    file.seek(SeekFrom::Start(0))?;

    let format = Format::default().with_header(true).with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.seek(SeekFrom::Start(0))?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_header(true)
        .with_delimiter(delimiter)
        .with_batch_size(batch_size)
        .build(file)?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Read a Parquet file into record batches
///
/// # Errors
/// Returns an IO error if the file cannot be opened or a Parquet error if it
/// is not a valid Parquet file.
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let file: File = safe_open_file(path, "cohort Parquet file")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Read a dataset file, choosing the format from the extension
///
/// # Errors
/// See [`read_csv`] and [`read_parquet`].
pub fn read_batches(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading cohort file", path);

    let batch_size = if batch_size == 0 {
        get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE)
    } else {
        batch_size
    };
    let batches = if is_parquet(path) {
        read_parquet(path, batch_size)?
    } else {
        read_csv(path, batch_size)?
    };

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Convert record batches into raw rows
///
/// The sex column is `gender` in the raw export and `sex` otherwise. Ages
/// are converted from days to years when any value exceeds
/// [`MAX_AGE_IN_YEARS`].
///
/// # Errors
/// Returns `MissingColumn` when a required column is absent.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn batches_to_rows(batches: &[RecordBatch]) -> Result<Vec<RawCohortRow>> {
    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());

    for batch in batches {
        let required = |name: &str| -> Result<Vec<Option<f64>>> {
            Ok(float_values(batch, name, true)?.unwrap_or_default())
        };

        let sex_column = if batch.schema().index_of("gender").is_ok() {
            "gender"
        } else {
            "sex"
        };
        let ids = float_values(batch, "id", false)?;
        let sex = sex_values(batch, sex_column)?;
        let age = required("age")?;
        let height = required("height")?;
        let weight = required("weight")?;
        let ap_hi = required("ap_hi")?;
        let ap_lo = required("ap_lo")?;
        let cholesterol = required("cholesterol")?;
        let gluc = required("gluc")?;
        let smoke = required("smoke")?;
        let alco = required("alco")?;
        let active = required("active")?;
        let cardio = required("cardio")?;

        for i in 0..batch.num_rows() {
            rows.push(RawCohortRow {
                id: ids
                    .as_ref()
                    .and_then(|ids| ids[i])
                    .filter(|v| *v >= 0.0)
                    .map(|v| v as u64),
                age: age[i],
                sex: sex[i],
                height: height[i],
                weight: weight[i],
                ap_hi: ap_hi[i],
                ap_lo: ap_lo[i],
                cholesterol: cholesterol[i],
                gluc: gluc[i],
                smoke: smoke[i],
                alco: alco[i],
                active: active[i],
                cardio: cardio[i],
            });
        }
    }

    if rows.iter().filter_map(|r| r.age).any(|a| a > MAX_AGE_IN_YEARS) {
        log::info!("Age column is in days, converting to years");
        for row in &mut rows {
            row.age = row.age.map(age_from_days);
        }
    }

    Ok(rows)
}

/// Load, clean and derive a cohort dataset
///
/// # Errors
/// Returns an error if the file cannot be read or lacks a required column.
pub fn load_cohort(path: &Path, batch_size: usize, config: &CleaningConfig) -> Result<Cohort> {
    let batches = read_batches(path, batch_size)?;
    let rows = batches_to_rows(&batches)?;
    let (records, report) = clean_cohort(&rows, config);
    log::info!("Loaded {} cohort records from {}", records.len(), path.display());
    Ok(Cohort { records, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DAYS_PER_YEAR;
    use std::io::Write;

    const RAW: &str = "id;age;gender;height;weight;ap_hi;ap_lo;cholesterol;gluc;smoke;alco;active;cardio
0;18393;2;168;62.0;110;80;1;1;0;0;1;0
1;20228;1;156;85.0;140;90;3;1;0;0;1;1
2;18857;1;165;64.0;70;130;3;1;0;0;0;1
3;17623;2;169;82.0;-150;100;1;1;0;0;1;1
";

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("id;age;gender"), b';');
        assert_eq!(sniff_delimiter("id,age,sex"), b',');
    }

    #[test]
    fn test_load_raw_export() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(RAW.as_bytes()).unwrap();

        let cohort = load_cohort(file.path(), 2, &CleaningConfig::default()).unwrap();
        assert_eq!(cohort.report.total_rows, 4);
        assert_eq!(cohort.report.non_positive_pressure, 1);
        assert_eq!(cohort.report.swapped_pressures, 1);
        assert_eq!(cohort.records.len(), 3);

        let first = &cohort.records[0];
        assert!((first.age - 18393.0 / DAYS_PER_YEAR).abs() < 1e-9);
        assert_eq!(first.sex, crate::models::Sex::Male);
        assert!((cohort.records[2].ap_hi - 130.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_cleaned_csv_without_id() {
        let csv = "age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio
52.1,female,160,60,120,80,1,1,0,0,1,0
61.0,male,175,90,150,95,2,2,1,0,0,1
";
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let cohort = load_cohort(file.path(), 0, &CleaningConfig::default()).unwrap();
        assert_eq!(cohort.records.len(), 2);
        assert_eq!(cohort.records[1].id, 1);
        assert!((cohort.records[0].age - 52.1).abs() < 1e-9);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"age,sex\n50,male\n").unwrap();
        assert!(matches!(
            load_cohort(file.path(), 0, &CleaningConfig::default()),
            Err(crate::error::CardioError::MissingColumn { .. })
        ));
    }
}
