//! Exporting the cleaned cohort to Parquet

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::datatypes::{FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::Result;
use crate::models::{CohortExportRow, CohortRecord};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Convert cohort records into a single record batch
///
/// # Errors
/// Returns a conversion error if the rows cannot be serialized.
pub fn cohort_to_record_batch(records: &[CohortRecord]) -> Result<RecordBatch> {
    let rows: Vec<CohortExportRow> = records.iter().map(CohortExportRow::from).collect();
    let fields = Vec::<FieldRef>::from_type::<CohortExportRow>(TracingOptions::default())?;
    Ok(serde_arrow::to_record_batch(&fields, &rows)?)
}

/// Write cohort records to a Snappy-compressed Parquet file
///
/// Returns the number of rows written.
///
/// # Errors
/// Returns an IO error if the file cannot be created, or a Parquet error if
/// writing fails.
pub fn write_cohort_parquet(path: &Path, records: &[CohortRecord]) -> Result<usize> {
    let start = Instant::now();
    log_operation_start("Writing cohort to", path);

    let batch = cohort_to_record_batch(records)?;
    let schema: Arc<Schema> = batch.schema();
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    log_operation_complete("wrote", path, records.len(), Some(start.elapsed()));
    Ok(records.len())
}
