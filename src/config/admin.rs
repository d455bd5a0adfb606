//! Typed view of a hub's `admin.json`.
//!
//! Only the keys this crate acts on are modelled as fields. Everything
//! else is kept verbatim in [`AdminConfig::extra`] so callers can still
//! reach it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default model-output directory name, relative to the hub root.
pub const DEFAULT_MODEL_OUTPUT_DIR: &str = "model-output";

/// Hub administration settings from `hub-config/admin.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Accepted model-output file formats, in declaration order.
    #[serde(default = "default_file_format")]
    pub file_format: Vec<String>,

    /// Name of the model-output directory when it isn't `model-output`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_output_dir: Option<String>,

    /// Remaining keys, in file order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_file_format() -> Vec<String> {
    vec!["csv".to_string(), "parquet".to_string(), "arrow".to_string()]
}

impl AdminConfig {
    /// The model-output directory name, falling back to the hubverse default.
    pub fn model_output_dir_name(&self) -> &str {
        self.model_output_dir
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_MODEL_OUTPUT_DIR)
    }
}
