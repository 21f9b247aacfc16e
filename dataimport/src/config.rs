//! Import configuration files.
//!
//! ```json
//! {
//!   "reader": { "fileName": "data/products.csv", "delimiter": ";", "offset": 10 },
//!   "import": { "flushEvery": 500 },
//!   "output": "products.jsonl",
//!   "previewRows": 5
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::importer::ImportOptions;
use crate::reader::CsvReaderConfiguration;

/// Everything needed to run one import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportConfiguration {
    pub reader: CsvReaderConfiguration,
    pub import: ImportOptions,
    /// JSON lines destination. `None` writes to stdout.
    pub output: Option<PathBuf>,
    /// Number of data sets to log before importing silently.
    pub preview_rows: usize,
}

impl ImportConfiguration {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
