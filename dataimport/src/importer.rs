//! Import driver.
//!
//! Pulls data sets from a [`DataReader`] one at a time and hands each to a
//! [`DataSetWriterCollection`]. Writers are flushed every `flush_every` data
//! sets (when set) and once at the end of the source.
//!
//! # Example
//!
//! ```rust,no_run
//! use dataimport::importer::{DataImporter, ImportOptions};
//! use dataimport::reader::{CsvReader, CsvReaderConfiguration};
//! use dataimport::writer::{DataSetWriter, DataSetWriterCollection, JsonLinesWriter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = CsvReader::new(CsvReaderConfiguration::new("products.csv"))?;
//!     let writers = DataSetWriterCollection::new(vec![
//!         DataSetWriter::item(JsonLinesWriter::create("products.jsonl")?),
//!     ]);
//!
//!     let report = DataImporter::new(reader, writers, ImportOptions::default()).import()?;
//!     println!("Imported {} data sets", report.imported_data_set_count);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success};
use crate::reader::DataReader;
use crate::writer::DataSetWriterCollection;

/// Options for an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    /// Flush writers after every N data sets. `None` flushes only at the end.
    pub flush_every: Option<usize>,
}

/// Outcome of a successful import run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataImportReport {
    /// Identifies the run in logs
    pub run_id: Uuid,
    pub imported_data_set_count: usize,
    /// Number of flushes, the final one included
    pub flush_count: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one reader into one writer collection.
pub struct DataImporter<R: DataReader> {
    reader: R,
    writers: DataSetWriterCollection,
    options: ImportOptions,
}

impl<R: DataReader> DataImporter<R> {
    pub fn new(reader: R, writers: DataSetWriterCollection, options: ImportOptions) -> Self {
        Self {
            reader,
            writers,
            options,
        }
    }

    /// Run the import from the first eligible data set.
    ///
    /// The first reader or writer error aborts the run.
    pub fn import(&mut self) -> ImportResult<DataImportReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        log_info(format!("Import {} started with {} writer(s)", run_id, self.writers.len()));

        match self.run() {
            Ok((imported, flushes)) => {
                let report = DataImportReport {
                    run_id,
                    imported_data_set_count: imported,
                    flush_count: flushes,
                    started_at,
                    finished_at: Utc::now(),
                };
                log_success(format!("Imported {} data sets", imported));
                Ok(report)
            }
            Err(e) => {
                log_error(format!(
                    "Import {} aborted at data set {}: {}",
                    run_id,
                    self.reader.key(),
                    e
                ));
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<(usize, usize), ImportError> {
        let mut imported = 0usize;
        let mut flushes = 0usize;

        self.reader.rewind()?;
        while self.reader.valid()? {
            let data_set = self.reader.current()?;
            self.writers.write(&data_set)?;
            imported += 1;

            if let Some(every) = self.options.flush_every.filter(|n| *n > 0) {
                if imported % every == 0 {
                    self.writers.flush()?;
                    flushes += 1;
                    log_info_indent(format!("Flushed after {} data sets", imported), 1);
                }
            }

            self.reader.next()?;
        }

        self.writers.flush()?;
        flushes += 1;
        Ok((imported, flushes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataSet;
    use crate::error::{ReaderError, WriterResult};
    use crate::reader::{CsvReader, CsvReaderConfiguration};
    use crate::writer::{DataSetWriter, DataSetWriterPlugin};
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct Sink {
        rows: Vec<String>,
        flushes: Vec<usize>,
    }

    struct SinkWriter(Rc<RefCell<Sink>>);

    impl DataSetWriterPlugin for SinkWriter {
        fn write(&mut self, data_set: &DataSet) -> WriterResult {
            let name = data_set.get("name")?.as_str().unwrap_or_default().to_string();
            self.0.borrow_mut().rows.push(name);
            Ok(())
        }

        fn flush(&mut self) -> WriterResult {
            let mut sink = self.0.borrow_mut();
            let written = sink.rows.len();
            sink.flushes.push(written);
            Ok(())
        }
    }

    fn fixture(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn importer(
        file: &NamedTempFile,
        options: ImportOptions,
    ) -> (DataImporter<CsvReader>, Rc<RefCell<Sink>>) {
        let sink = Rc::new(RefCell::new(Sink::default()));
        let reader = CsvReader::new(CsvReaderConfiguration::new(file.path())).unwrap();
        let writers = DataSetWriterCollection::new(vec![DataSetWriter::data_set(SinkWriter(sink.clone()))]);
        (DataImporter::new(reader, writers, options), sink)
    }

    #[test]
    fn test_imports_every_data_set_then_flushes() {
        let file = fixture("name\nAda\nAlan\nGrace\n");
        let (mut importer, sink) = importer(&file, ImportOptions::default());

        let report = importer.import().unwrap();
        assert_eq!(report.imported_data_set_count, 3);
        assert_eq!(report.flush_count, 1);
        assert!(report.finished_at >= report.started_at);
        assert_eq!(sink.borrow().rows, vec!["Ada", "Alan", "Grace"]);
        assert_eq!(sink.borrow().flushes, vec![3]);
    }

    #[test]
    fn test_flush_every() {
        let file = fixture("name\na\nb\nc\nd\ne\n");
        let (mut importer, sink) = importer(&file, ImportOptions { flush_every: Some(2) });

        let report = importer.import().unwrap();
        assert_eq!(report.flush_count, 3);
        assert_eq!(sink.borrow().flushes, vec![2, 4, 5]);
    }

    #[test]
    fn test_empty_source_still_flushes() {
        let file = fixture("name\n");
        let (mut importer, sink) = importer(&file, ImportOptions::default());

        let report = importer.import().unwrap();
        assert_eq!(report.imported_data_set_count, 0);
        assert_eq!(sink.borrow().flushes, vec![0]);
    }

    #[test]
    fn test_mismatch_aborts_without_final_flush() {
        let file = fixture("name,age\nAda,36\nAlan\nGrace,85\n");
        let (mut importer, sink) = importer(&file, ImportOptions::default());

        let err = importer.import().unwrap_err();
        assert!(matches!(
            err,
            ImportError::Reader(ReaderError::HeaderDataSetMismatch { line: 3, .. })
        ));
        assert_eq!(sink.borrow().rows, vec!["Ada"]);
        assert!(sink.borrow().flushes.is_empty());
    }

    #[test]
    fn test_writer_key_error_aborts_run() {
        let file = fixture("title\nDune\n");
        let (mut importer, _sink) = importer(&file, ImportOptions::default());

        let err = importer.import().unwrap_err();
        assert!(matches!(err, ImportError::Writer(_)));
        assert!(err.to_string().contains("Available keys: \"title\""));
    }

    #[test]
    fn test_import_twice_rewinds() {
        let file = fixture("name\nAda\n");
        let (mut importer, sink) = importer(&file, ImportOptions::default());

        importer.import().unwrap();
        importer.import().unwrap();
        assert_eq!(sink.borrow().rows, vec!["Ada", "Ada"]);
    }
}
