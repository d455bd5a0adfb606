//! Model-output datasets.
//!
//! A hub's model-output directory holds one subdirectory per model:
//!
//! ```text
//! model-output/
//! ├── team1-goodmodel/
//! │   ├── 2022-10-08-team1-goodmodel.csv
//! │   └── 2022-10-15-team1-goodmodel.parquet
//! └── hub-baseline/
//!     └── 2022-10-08-hub-baseline.parquet
//! ```
//!
//! [`HubDataset::discover`] groups the files by format into
//! [`FileSystemDataset`] children and exposes their union under the hub
//! schema. Directory names below the model-output directory become partition
//! values: the first level fills the first partition column (`model_id` by
//! default), the second level the second, and so on.

mod filter;
mod format;
mod read;

pub use filter::Predicate;
pub use format::FileFormat;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::compute::{concat_batches, filter_record_batch};
use arrow::datatypes::SchemaRef;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::HubError;
use crate::schema::MODEL_ID;

/// One model-output file and the partition values derived from its location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetFile {
    pub path: PathBuf,
    /// Partition column names paired with the directory names filling them.
    pub partitions: Vec<(String, String)>,
}

impl DatasetFile {
    /// The directory value of partition column `name`.
    pub fn partition(&self, name: &str) -> Option<&str> {
        self.partitions
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn model_id(&self) -> Option<&str> {
        self.partition(MODEL_ID)
    }
}

/// Which columns and rows a scan returns.
#[derive(Clone, Debug, Default)]
pub struct ScanOptions {
    /// Columns to keep, in this order. `None` keeps the full hub schema.
    pub columns: Option<Vec<String>>,
    /// Rows to keep. `None` keeps all rows.
    pub predicate: Option<Predicate>,
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Add a predicate, and-ing it with any predicate already set.
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Resolve the projection to column indices and check the predicate.
    fn plan(&self, schema: &SchemaRef) -> Result<Option<Vec<usize>>, HubError> {
        if let Some(predicate) = &self.predicate {
            predicate.validate(schema)?;
        }

        self.columns
            .as_ref()
            .map(|columns| {
                columns
                    .iter()
                    .map(|name| {
                        schema
                            .index_of(name)
                            .map_err(|_| HubError::UnknownColumn(name.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
    }
}

/// All files of a single format.
#[derive(Clone, Debug)]
pub struct FileSystemDataset {
    format: FileFormat,
    files: Vec<DatasetFile>,
    schema: SchemaRef,
}

impl FileSystemDataset {
    pub fn new(format: FileFormat, files: Vec<DatasetFile>, schema: SchemaRef) -> Self {
        Self {
            format,
            files,
            schema,
        }
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn files(&self) -> &[DatasetFile] {
        &self.files
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Number of rows, optionally only those matching `predicate`.
    pub fn count_rows(&self, predicate: Option<&Predicate>) -> Result<usize, HubError> {
        if let Some(predicate) = predicate {
            predicate.validate(&self.schema)?;
        }

        let mut total = 0;
        for file in &self.files {
            if predicate.is_none() {
                if let Some(rows) = read::metadata_row_count(file, self.format)? {
                    total += rows;
                    continue;
                }
            }

            for batch in read::read_file(file, self.format, &self.schema)? {
                total += match predicate {
                    Some(predicate) => predicate.evaluate(&batch)?.true_count(),
                    None => batch.num_rows(),
                };
            }
        }
        Ok(total)
    }

    /// Read all matching rows as batches.
    pub fn scan(&self, options: &ScanOptions) -> Result<Vec<RecordBatch>, HubError> {
        let projection = options.plan(&self.schema)?;
        let mut batches = Vec::new();
        for file in &self.files {
            for batch in read::read_file(file, self.format, &self.schema)? {
                let batch = match &options.predicate {
                    Some(predicate) => filter_record_batch(&batch, &predicate.evaluate(&batch)?)?,
                    None => batch,
                };
                let batch = match &projection {
                    Some(indices) => batch.project(indices)?,
                    None => batch,
                };
                batches.push(batch);
            }
        }
        Ok(batches)
    }
}

/// The union of a hub's per-format datasets.
#[derive(Clone, Debug)]
pub struct HubDataset {
    schema: SchemaRef,
    children: Vec<FileSystemDataset>,
}

impl HubDataset {
    /// A dataset with no files.
    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            schema,
            children: Vec::new(),
        }
    }

    /// Scan `model_output_dir` for files in any of `formats`.
    ///
    /// Files must sit in a subdirectory, nested deep enough to supply one
    /// directory name per entry of `partitions`; files directly in the root
    /// and hidden files or directories are skipped. Children are created in
    /// `formats` order and only for formats with at least one file. A missing
    /// directory yields an empty dataset.
    pub fn discover(
        model_output_dir: &Path,
        formats: &[FileFormat],
        partitions: &[String],
        schema: SchemaRef,
    ) -> Result<Self, HubError> {
        if !model_output_dir.is_dir() {
            tracing::warn!(
                dir = %model_output_dir.display(),
                "model output directory not found; dataset is empty"
            );
            return Ok(Self::empty(schema));
        }

        let mut by_format: Vec<(FileFormat, Vec<DatasetFile>)> =
            formats.iter().map(|format| (*format, Vec::new())).collect();

        let walker = WalkDir::new(model_output_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = entry.map_err(|source| HubError::Io(source.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(values) = partition_values(model_output_dir, path, partitions) else {
                tracing::debug!(path = %path.display(), "skipping file outside a partition directory");
                continue;
            };
            let Some(format) = FileFormat::from_path(path) else {
                tracing::debug!(path = %path.display(), "skipping file with unknown extension");
                continue;
            };
            let Some((_, files)) = by_format.iter_mut().find(|(f, _)| *f == format) else {
                tracing::warn!(path = %path.display(), %format, "skipping file in a format the hub does not accept");
                continue;
            };

            files.push(DatasetFile {
                path: path.to_path_buf(),
                partitions: values,
            });
        }

        let children: Vec<FileSystemDataset> = by_format
            .into_iter()
            .filter(|(_, files)| !files.is_empty())
            .map(|(format, files)| FileSystemDataset::new(format, files, Arc::clone(&schema)))
            .collect();

        tracing::debug!(
            dir = %model_output_dir.display(),
            children = children.len(),
            files = children.iter().map(|c| c.files.len()).sum::<usize>(),
            "discovered model output files"
        );

        Ok(Self { schema, children })
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect()
    }

    pub fn children(&self) -> &[FileSystemDataset] {
        &self.children
    }

    /// All files across every child.
    pub fn files(&self) -> impl Iterator<Item = &DatasetFile> {
        self.children.iter().flat_map(|child| child.files.iter())
    }

    pub fn num_files(&self) -> usize {
        self.children.iter().map(|child| child.files.len()).sum()
    }

    /// Extension of each child's format, in child order.
    pub fn file_types(&self) -> Vec<&'static str> {
        self.children
            .iter()
            .map(|child| child.format.default_extname())
            .collect()
    }

    /// Distinct model ids, sorted.
    pub fn model_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.files().filter_map(DatasetFile::model_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn count_rows(&self, predicate: Option<&Predicate>) -> Result<usize, HubError> {
        if let Some(predicate) = predicate {
            predicate.validate(&self.schema)?;
        }

        self.children
            .iter()
            .map(|child| child.count_rows(predicate))
            .sum()
    }

    pub fn scan(&self, options: &ScanOptions) -> Result<Vec<RecordBatch>, HubError> {
        // checked up front so an empty dataset still rejects bad options
        options.plan(&self.schema)?;

        let mut batches = Vec::new();
        for child in &self.children {
            batches.extend(child.scan(options)?);
        }
        Ok(batches)
    }

    /// Scan and concatenate everything into a single batch.
    pub fn to_table(&self, options: &ScanOptions) -> Result<RecordBatch, HubError> {
        let schema = match options.plan(&self.schema)? {
            Some(indices) => Arc::new(self.schema.project(&indices)?),
            None => Arc::clone(&self.schema),
        };
        let batches = self.scan(options)?;
        Ok(concat_batches(&schema, &batches)?)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|name| name.starts_with('.'))
}

/// Pair each of `names` with a directory name of `path`, outermost first.
///
/// `None` if `path` is not below `root`, sits directly in it, or has fewer
/// directory levels than `names`.
fn partition_values(root: &Path, path: &Path, names: &[String]) -> Option<Vec<(String, String)>> {
    let relative = path.strip_prefix(root).ok()?;
    let components: Vec<&str> = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<_>>()?;
    let (_file, dirs) = components.split_last()?;
    if dirs.is_empty() || dirs.len() < names.len() {
        return None;
    }

    Some(
        names
            .iter()
            .zip(dirs)
            .map(|(name, dir)| (name.clone(), (*dir).to_string()))
            .collect(),
    )
}
