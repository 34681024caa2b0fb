//! Async wrappers around cohort IO
//!
//! Parquet files are streamed with the async Parquet reader; CSV parsing and
//! Parquet writing are blocking and run on Tokio's blocking pool.

use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use tokio::fs::File;

use crate::config::{CleaningConfig, DEFAULT_BATCH_SIZE};
use crate::error::{CardioError, Result};
use crate::models::CohortRecord;
use crate::reader::{Cohort, batches_to_rows, clean_cohort, get_batch_size, read_csv, write_cohort_parquet};
use crate::utils::logging::{
    create_spinner, finish_progress_bar, log_operation_complete, log_operation_start,
};

fn join_error(e: tokio::task::JoinError) -> CardioError {
    CardioError::Io(std::io::Error::other(format!("Task join error: {e}")))
}

fn effective_batch_size(batch_size: usize) -> usize {
    if batch_size == 0 {
        get_batch_size().unwrap_or(DEFAULT_BATCH_SIZE)
    } else {
        batch_size
    }
}

/// Stream a Parquet file into record batches
///
/// # Errors
/// Returns an IO error if the file cannot be opened or a Parquet error if
/// decoding fails.
pub async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file asynchronously", path);

    let file = File::open(path).await?;
    let stream = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(effective_batch_size(batch_size))
        .build()?;
    let batches = stream.try_collect::<Vec<_>>().await?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Read a CSV file on the blocking pool
///
/// # Errors
/// See [`read_csv`].
pub async fn read_csv_async(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let path: PathBuf = path.to_path_buf();
    let batch_size = effective_batch_size(batch_size);
    tokio::task::spawn_blocking(move || read_csv(&path, batch_size))
        .await
        .map_err(join_error)?
}

/// Load, clean and derive a cohort without blocking the runtime
///
/// # Errors
/// Returns an error if the file cannot be read or lacks a required column.
pub async fn load_cohort_async(
    path: &Path,
    batch_size: usize,
    config: &CleaningConfig,
) -> Result<Cohort> {
    let batches = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
    {
        read_parquet_async(path, batch_size).await?
    } else {
        read_csv_async(path, batch_size).await?
    };

    let config = config.clone();
    let spinner = create_spinner(Some("Cleaning cohort"));
    let cohort = tokio::task::spawn_blocking(move || -> Result<Cohort> {
        let rows = batches_to_rows(&batches)?;
        let (records, report) = clean_cohort(&rows, &config);
        Ok(Cohort { records, report })
    })
    .await
    .map_err(join_error)??;
    finish_progress_bar(&spinner, Some("Cohort cleaned"));

    log::info!(
        "Loaded {} cohort records from {}",
        cohort.records.len(),
        path.display()
    );
    Ok(cohort)
}

/// Write the cohort to Parquet on the blocking pool
///
/// # Errors
/// See [`write_cohort_parquet`].
pub async fn write_cohort_parquet_async(path: &Path, records: Vec<CohortRecord>) -> Result<usize> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_cohort_parquet(&path, &records))
        .await
        .map_err(join_error)?
}
