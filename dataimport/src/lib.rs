//! # Dataimport - streaming CSV import
//!
//! Dataimport reads delimited files one row at a time, turns every row into a
//! [`DataSet`] and fans it out to pluggable writers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│  CsvReader  │────▶│  Importer   │────▶│   Writers   │
//! │             │     │ (windowed)  │     │ (driver)    │     │ (filtered)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataimport::{CsvReader, CsvReaderConfiguration, DataImporter, ImportOptions};
//! use dataimport::{DataSetWriter, DataSetWriterCollection, JsonLinesWriter};
//!
//! let reader = CsvReader::new(CsvReaderConfiguration::new("input.csv").with_offset(Some(1)))?;
//! let writers = DataSetWriterCollection::new(vec![DataSetWriter::item(JsonLinesWriter::stdout())]);
//! let report = DataImporter::new(reader, writers, ImportOptions::default()).import()?;
//! eprintln!("Imported {} data sets", report.imported_data_set_count);
//! # Ok::<(), dataimport::ImportError>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`dataset`] - Data sets and the writer envelope
//! - [`reader`] - Pull-based readers and the CSV reader
//! - [`writer`] - Writer plugins and their collection
//! - [`importer`] - Driver loop
//! - [`config`] - Configuration files
//! - [`logs`] - Run logging

// Core modules
pub mod error;
pub mod logs;

// Data
pub mod dataset;

// Reading
pub mod reader;

// Writing
pub mod writer;

// Driver
pub mod config;
pub mod importer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, DataSetError, ImportError, ReaderError, WriterError, WriterResult,
};

// =============================================================================
// Re-exports - Data sets
// =============================================================================

pub use dataset::{DataKey, DataSet, DataSetItem, Payload};

// =============================================================================
// Re-exports - Readers
// =============================================================================

pub use reader::{
    ConfigurableDataReader, CsvFlags, CsvReader, CsvReaderConfiguration, DataReader,
};

// =============================================================================
// Re-exports - Writers
// =============================================================================

pub use writer::{
    DataSetItemWriterPlugin, DataSetWriter, DataSetWriterCollection, DataSetWriterPlugin,
    JsonLinesWriter, PreviewWriter,
};

// =============================================================================
// Re-exports - Driver
// =============================================================================

pub use config::ImportConfiguration;
pub use importer::{DataImportReport, DataImporter, ImportOptions};
