use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::HubError;

/// A model-output file format a hub may accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Parquet,
    /// Arrow IPC file format (a.k.a. Feather v2).
    Arrow,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::Csv, FileFormat::Parquet, FileFormat::Arrow];

    /// The canonical file extension, without the dot.
    pub fn default_extname(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Arrow => "arrow",
        }
    }

    /// Every extension recognized for this format.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileFormat::Csv => &["csv"],
            FileFormat::Parquet => &["parquet"],
            FileFormat::Arrow => &["arrow", "feather", "ipc"],
        }
    }

    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<FileFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        FileFormat::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_extname())
    }
}

impl FromStr for FileFormat {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FileFormat::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&lower.as_str()))
            .ok_or_else(|| {
                HubError::UnsupportedFileFormat(format!(
                    "'{}' (supported: csv, parquet, arrow)",
                    s
                ))
            })
    }
}
