//! Hub configuration loading.
//!
//! A hub keeps its configuration under `<hub_dir>/hub-config/`:
//!
//! - `tasks.json`: rounds, model tasks, task ids and output types
//! - `admin.json`: hub metadata, accepted file formats, model-output location
//! - `model-metadata-schema.json`: JSON schema for model metadata files
//!
//! All three files are required. `tasks.json` and the metadata schema are
//! kept as raw JSON with their key order intact; `admin.json` is parsed into
//! [`AdminConfig`].

mod admin;

pub use admin::{AdminConfig, DEFAULT_MODEL_OUTPUT_DIR};

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dataset::FileFormat;
use crate::error::HubError;

/// Name of the configuration directory inside a hub.
pub const HUB_CONFIG_DIR: &str = "hub-config";
pub const TASKS_FILE: &str = "tasks.json";
pub const ADMIN_FILE: &str = "admin.json";
pub const MODEL_METADATA_SCHEMA_FILE: &str = "model-metadata-schema.json";

/// Parsed configuration of a hub rooted at `hub_dir`.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// The hub root, exactly as passed to [`HubConfig::load`].
    pub hub_dir: PathBuf,
    /// `tasks.json` contents.
    pub tasks: Value,
    /// `admin.json` contents.
    pub admin: AdminConfig,
    /// `model-metadata-schema.json` contents.
    pub model_metadata_schema: Value,
}

impl HubConfig {
    /// Load the configuration of the hub rooted at `hub_dir`.
    ///
    /// # Errors
    /// - [`HubError::HubDirNotFound`] if `hub_dir` is not an existing directory
    /// - [`HubError::ConfigNotFound`] if a required JSON file is missing
    /// - [`HubError::ConfigParse`] if a file is not valid JSON
    /// - [`HubError::InvalidConfig`] if `tasks.json` has no `rounds` array
    pub fn load(hub_dir: impl AsRef<Path>) -> Result<Self, HubError> {
        let hub_dir = hub_dir.as_ref().to_path_buf();
        if !hub_dir.is_dir() {
            return Err(HubError::HubDirNotFound(hub_dir));
        }

        let config_dir = hub_dir.join(HUB_CONFIG_DIR);
        let tasks_path = config_dir.join(TASKS_FILE);
        let tasks: Value = read_json(&tasks_path)?;
        check_tasks(&tasks_path, &tasks)?;

        let admin: AdminConfig = read_json(&config_dir.join(ADMIN_FILE))?;
        let model_metadata_schema: Value =
            read_json(&config_dir.join(MODEL_METADATA_SCHEMA_FILE))?;

        tracing::debug!(
            hub_dir = %hub_dir.display(),
            rounds = tasks["rounds"].as_array().map_or(0, Vec::len),
            "loaded hub config"
        );

        Ok(Self {
            hub_dir,
            tasks,
            admin,
            model_metadata_schema,
        })
    }

    /// Absolute-or-relative path of the model-output directory.
    ///
    /// Uses `admin.json`'s `model_output_dir` if present, else `model-output`.
    pub fn model_output_dir(&self) -> PathBuf {
        self.hub_dir.join(self.admin.model_output_dir_name())
    }

    /// The file formats declared in `admin.json`, in declaration order.
    ///
    /// # Errors
    /// Returns [`HubError::UnsupportedFileFormat`] for names other than
    /// csv, parquet or arrow.
    pub fn file_formats(&self) -> Result<Vec<FileFormat>, HubError> {
        let mut formats = Vec::with_capacity(self.admin.file_format.len());
        for name in &self.admin.file_format {
            let format: FileFormat = name.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }

    /// The round objects from `tasks.json`.
    pub fn rounds(&self) -> &[Value] {
        self.tasks["rounds"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// One identifier per round.
    ///
    /// For rounds with `round_id_from_variable: true`, this is the name of the
    /// task id whose values identify the round rather than a literal id.
    pub fn round_ids(&self) -> Vec<String> {
        self.rounds()
            .iter()
            .filter_map(|round| round.get("round_id").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, HubError> {
    if !path.is_file() {
        return Err(HubError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(HubError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| HubError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

fn check_tasks(path: &Path, tasks: &Value) -> Result<(), HubError> {
    let invalid = |message: &str| HubError::InvalidConfig {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let obj = tasks
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object at the top level"))?;
    match obj.get("rounds") {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(invalid("'rounds' must be an array")),
        None => Err(invalid("missing 'rounds'")),
    }
}
