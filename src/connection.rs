//! The main entry point: connect to a hub and reach its schema and data.

use std::path::{Path, PathBuf};

use arrow::datatypes::SchemaRef;
use serde_json::Value;

use crate::config::{AdminConfig, HubConfig};
use crate::dataset::HubDataset;
use crate::error::HubError;
use crate::schema::{create_hub_schema, SchemaOptions};

/// Connect to the hub rooted at `hub_dir`.
///
/// See <https://docs.hubverse.io/en/latest/user-guide/hub-structure.html>
/// for the expected layout.
///
/// # Errors
/// Fails if `hub_dir` or one of its required config files is missing or
/// malformed, or if the schema cannot be derived from `tasks.json`.
///
/// # Example
/// ```no_run
/// use hubdata::connect_hub;
///
/// let hub = connect_hub("hubs/example-complex-forecast-hub")?;
/// let dataset = hub.get_dataset()?;
/// println!("{} rows", dataset.count_rows(None)?);
/// # Ok::<(), hubdata::HubError>(())
/// ```
pub fn connect_hub(hub_dir: impl AsRef<Path>) -> Result<HubConnection, HubError> {
    HubConnection::new(HubConfig::load(hub_dir)?, &SchemaOptions::default())
}

/// A loaded hub: its configuration plus the derived schema.
///
/// Create with [`connect_hub`].
#[derive(Clone, Debug)]
pub struct HubConnection {
    config: HubConfig,
    schema: SchemaRef,
    partitions: Vec<String>,
}

impl HubConnection {
    fn new(config: HubConfig, options: &SchemaOptions) -> Result<Self, HubError> {
        let schema = create_hub_schema(&config.tasks, options)?;
        let partitions = options
            .partitions
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        tracing::info!(hub_dir = %config.hub_dir.display(), "connected to hub");
        Ok(Self {
            config,
            schema,
            partitions,
        })
    }

    /// Rebuild the schema with non-default options.
    pub fn with_schema_options(self, options: &SchemaOptions) -> Result<Self, HubError> {
        Self::new(self.config, options)
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn hub_dir(&self) -> &Path {
        &self.config.hub_dir
    }

    pub fn tasks(&self) -> &Value {
        &self.config.tasks
    }

    pub fn admin(&self) -> &AdminConfig {
        &self.config.admin
    }

    pub fn model_metadata_schema(&self) -> &Value {
        &self.config.model_metadata_schema
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Partition column names, filled from model-output directory levels.
    pub fn partitions(&self) -> &[String] {
        &self.partitions
    }

    pub fn model_output_dir(&self) -> PathBuf {
        self.config.model_output_dir()
    }

    /// The union dataset over all model-output files.
    pub fn get_dataset(&self) -> Result<HubDataset, HubError> {
        let formats = self.config.file_formats()?;
        HubDataset::discover(
            &self.model_output_dir(),
            &formats,
            &self.partitions,
            self.schema.clone(),
        )
    }
}
