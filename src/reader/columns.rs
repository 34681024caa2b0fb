//! Typed column access on record batches
//!
//! CSV inference and Parquet files disagree on integer widths, so numeric
//! columns are cast to `Float64` on access and textual columns to `Utf8`.

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;

use crate::error::{CardioError, Result};
use crate::models::Sex;

/// Get a column, cast to `expected_type` when needed
///
/// Returns `Ok(None)` when an optional column is absent.
///
/// # Errors
/// Returns `MissingColumn` for an absent required column, or the Arrow error
/// when the cast is not supported.
pub fn get_column(
    batch: &RecordBatch,
    column_name: &str,
    expected_type: &DataType,
    required: bool,
) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(column_name) else {
        if required {
            return Err(CardioError::MissingColumn {
                column: column_name.to_string(),
            });
        }
        return Ok(None);
    };

    let column = batch.column(idx);
    if column.data_type() == expected_type {
        return Ok(Some(column.clone()));
    }

    log::debug!(
        "Casting column '{column_name}' from {:?} to {expected_type:?}",
        column.data_type()
    );
    Ok(Some(cast(column, expected_type)?))
}

/// Downcast an array, naming the column on failure
///
/// # Errors
/// Returns an Arrow schema error when the array has another concrete type.
pub fn downcast_array<'a, A: Array + 'static>(array: &'a ArrayRef, column_name: &str) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        CardioError::Arrow(arrow::error::ArrowError::SchemaError(format!(
            "column '{column_name}' has unexpected type {:?}",
            array.data_type()
        )))
    })
}

/// Values of a numeric column as `f64`, nulls as `None`
///
/// # Errors
/// See [`get_column`].
pub fn float_values(
    batch: &RecordBatch,
    column_name: &str,
    required: bool,
) -> Result<Option<Vec<Option<f64>>>> {
    let Some(array) = get_column(batch, column_name, &DataType::Float64, required)? else {
        return Ok(None);
    };
    let values = downcast_array::<Float64Array>(&array, column_name)?;
    Ok(Some(values.iter().collect()))
}

/// Values of the sex column, from either labels or numeric codes
///
/// Labels are `female`/`male`; codes are 1 = female, 2 = male.
///
/// # Errors
/// See [`get_column`].
#[allow(clippy::cast_possible_truncation)]
pub fn sex_values(batch: &RecordBatch, column_name: &str) -> Result<Vec<Option<Sex>>> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| CardioError::MissingColumn {
            column: column_name.to_string(),
        })?;

    match batch.column(idx).data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let array = get_column(batch, column_name, &DataType::Utf8, true)?
                .ok_or_else(|| CardioError::MissingColumn {
                    column: column_name.to_string(),
                })?;
            let labels = downcast_array::<StringArray>(&array, column_name)?;
            Ok(labels.iter().map(|v| v.and_then(Sex::from_label)).collect())
        }
        _ => {
            let codes = float_values(batch, column_name, true)?.unwrap_or_default();
            Ok(codes
                .into_iter()
                .map(|v| v.and_then(|c| Sex::from_code(c as i64)))
                .collect())
        }
    }
}
