//! Per-format readers that load one model-output file as hub-shaped batches.

use std::fs::File;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use arrow::array::{new_null_array, ArrayRef, RecordBatch, StringArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::{FileReader, SerializedFileReader};
use regex::Regex;

use super::{DatasetFile, FileFormat};
use crate::error::HubError;

/// CSV cells treated as missing.
static CSV_NULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(NA)?$").expect("valid CSV null pattern"));


/// Read every batch of `file`, conformed to `schema`.
pub(crate) fn read_file(
    file: &DatasetFile,
    format: FileFormat,
    schema: &SchemaRef,
) -> Result<Vec<RecordBatch>, HubError> {
    tracing::debug!(path = %file.path.display(), %format, "reading model-output file");

    let raw = match format {
        FileFormat::Csv => read_csv(file, schema)?,
        FileFormat::Parquet => read_parquet(&file.path)?,
        FileFormat::Arrow => read_ipc(&file.path)?,
    };

    raw.iter()
        .map(|batch| conform_batch(batch, schema, &file.partitions))
        .collect()
}

/// Row count of `file` without decoding data, where the format allows it.
pub(crate) fn metadata_row_count(file: &DatasetFile, format: FileFormat) -> Result<Option<usize>, HubError> {
    match format {
        FileFormat::Parquet => {
            let reader = SerializedFileReader::new(File::open(&file.path)?)?;
            let rows = reader.metadata().file_metadata().num_rows();
            Ok(Some(usize::try_from(rows).unwrap_or_default()))
        }
        FileFormat::Csv | FileFormat::Arrow => Ok(None),
    }
}

fn read_csv(file: &DatasetFile, schema: &SchemaRef) -> Result<Vec<RecordBatch>, HubError> {
    let path = file.path.as_path();
    let header = csv_header(path)?;

    // Typed read: hub columns get their hub type; partition and unknown columns
    // are read as text and replaced or dropped when conforming.
    let fields: Vec<Field> = header
        .iter()
        .map(|name| match schema.field_with_name(name) {
            Ok(field) if file.partition(name).is_none() => {
                Field::new(name, field.data_type().clone(), true)
            }
            _ => Field::new(name, DataType::Utf8, true),
        })
        .collect();

    let reader = arrow::csv::ReaderBuilder::new(Arc::new(Schema::new(fields)))
        .with_header(true)
        .with_null_regex(CSV_NULL.clone())
        .build(File::open(path)?)?;

    reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(HubError::Arrow)
}

fn csv_header(path: &Path) -> Result<Vec<String>, HubError> {
    let csv_error = |source: csv::Error| HubError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let header = reader.headers().map_err(csv_error)?;
    Ok(header.iter().map(|name| name.trim().to_string()).collect())
}

fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, HubError> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;

    reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(HubError::Arrow)
}

fn read_ipc(path: &Path) -> Result<Vec<RecordBatch>, HubError> {
    let reader = arrow::ipc::reader::FileReader::try_new(File::open(path)?, None)?;

    reader
        .collect::<Result<Vec<_>, ArrowError>>()
        .map_err(HubError::Arrow)
}

/// Reshape `batch` to `schema`.
///
/// Columns are matched by name and cast to the hub type; missing columns are
/// all-null; partition columns always come from the file's directories.
/// A value that cannot be represented in the hub type fails the read.
pub(crate) fn conform_batch(
    batch: &RecordBatch,
    schema: &SchemaRef,
    partitions: &[(String, String)],
) -> Result<RecordBatch, HubError> {
    let num_rows = batch.num_rows();
    let strict = CastOptions {
        safe: false,
        ..Default::default()
    };
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let target = field.data_type();
        let partition = partitions
            .iter()
            .find(|(name, _)| name == field.name())
            .map(|(_, value)| value.as_str());
        let column = match (partition, batch.column_by_name(field.name())) {
            (Some(value), _) => {
                let values: ArrayRef = Arc::new(StringArray::from(vec![value; num_rows]));
                cast_with_options(&values, target, &strict)?
            }
            (None, Some(column)) if column.data_type() == target => Arc::clone(column),
            (None, Some(column)) => cast_with_options(column, target, &strict)?,
            (None, None) => new_null_array(target, num_rows),
        };
        columns.push(column);
    }

    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}
