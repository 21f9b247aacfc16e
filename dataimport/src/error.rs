//! Error types for the data import pipeline.
//!
//! This module defines one error type per layer:
//!
//! - [`DataSetError`] - Key lookups on a [`crate::dataset::DataSet`]
//! - [`ReaderError`] - Opening, positioning and materializing CSV rows
//! - [`ConfigError`] - Loading import configuration files
//! - [`ImportError`] - Top-level driver errors
//!
//! Writer plugins report failures as an opaque [`WriterError`]. The writer
//! collection hands them back untouched; only the importer wraps them.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Data Set Errors
// =============================================================================

/// Errors raised by data set key access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataSetError {
    /// The key is not present. `available` lists the keys that are.
    #[error("The key \"{key}\" was not found in data set. Available keys: \"{}\"", .available.join(", "))]
    KeyNotFound { key: String, available: Vec<String> },
}

// =============================================================================
// Reader Errors
// =============================================================================

/// Errors raised while reading a delimited source.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The source could not be opened.
    #[error("Cannot open file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data row does not have as many fields as the header.
    #[error("Line {line}: header has {header_len} columns but data set has {row_len}")]
    HeaderDataSetMismatch {
        line: u64,
        header_len: usize,
        row_len: usize,
    },

    /// The CSV parser failed on a row.
    #[error("Invalid CSV: {0}")]
    Parse(#[from] csv::Error),

    /// The reader configuration cannot be applied.
    #[error("Invalid reader configuration: {0}")]
    InvalidConfiguration(String),

    /// `current()` was called while the reader is not on a valid position.
    #[error("No current data set at position {position}")]
    NoCurrentDataSet { position: usize },

    /// Building the data set failed.
    #[error(transparent)]
    DataSet(#[from] DataSetError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading an import configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read file.
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON decoding failed.
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Writer Errors
// =============================================================================

/// Failure reported by a writer plugin.
pub type WriterError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import errors.
///
/// This is the error type returned by [`crate::importer::DataImporter::import`].
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reader error.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A writer plugin failed.
    #[error("Writer error: {0}")]
    Writer(#[from] WriterError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for data set operations.
pub type DataSetResult<T> = Result<T, DataSetError>;

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Result type for writer plugin operations.
pub type WriterResult = Result<(), WriterError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for import runs.
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_lists_available_keys() {
        let err = DataSetError::KeyNotFound {
            key: "sku".into(),
            available: vec!["name".into(), "age".into()],
        };
        assert_eq!(
            err.to_string(),
            "The key \"sku\" was not found in data set. Available keys: \"name, age\""
        );
    }

    #[test]
    fn test_error_conversion_chain() {
        // DataSetError -> ReaderError -> ImportError
        let ds_err = DataSetError::KeyNotFound {
            key: "title".into(),
            available: vec![],
        };
        let reader_err: ReaderError = ds_err.into();
        let import_err: ImportError = reader_err.into();
        assert!(import_err.to_string().contains("title"));

        let writer_err: WriterError = "queue unavailable".into();
        let import_err: ImportError = writer_err.into();
        assert!(import_err.to_string().contains("queue unavailable"));
    }

    #[test]
    fn test_mismatch_format() {
        let err = ReaderError::HeaderDataSetMismatch {
            line: 4,
            header_len: 3,
            row_len: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 4"));
        assert!(msg.contains("3 columns"));
        assert!(msg.contains("has 2"));
    }
}
