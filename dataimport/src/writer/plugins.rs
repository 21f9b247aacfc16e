//! Writer plugins shipped with the importer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::{DataSetItemWriterPlugin, DataSetWriterPlugin};
use crate::dataset::{DataSet, DataSetItem, PayloadObject};
use crate::error::WriterResult;
use crate::logs::log_info_indent;

// =============================================================================
// JSON Lines
// =============================================================================

/// Writes each item payload as one JSON object per line.
pub struct JsonLinesWriter<W: Write> {
    out: BufWriter<W>,
    written: usize,
}

impl JsonLinesWriter<File> {
    /// Create (or truncate) `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl JsonLinesWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            written: 0,
        }
    }

    /// Number of lines written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.out.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> DataSetItemWriterPlugin for JsonLinesWriter<W> {
    fn write(&mut self, item: &DataSetItem) -> WriterResult {
        serde_json::to_writer(&mut self.out, &PayloadObject(item.payload()))?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> WriterResult {
        self.out.flush()?;
        Ok(())
    }
}

// =============================================================================
// Preview
// =============================================================================

/// Logs the first `rows` data sets, then drops out of the run.
#[derive(Debug, Clone)]
pub struct PreviewWriter {
    rows: usize,
    shown: usize,
}

impl PreviewWriter {
    pub fn new(rows: usize) -> Self {
        Self { rows, shown: 0 }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl DataSetWriterPlugin for PreviewWriter {
    fn write(&mut self, data_set: &DataSet) -> WriterResult {
        self.shown += 1;
        let line = serde_json::to_string(data_set)?;
        log_info_indent(format!("#{} {}", self.shown, line), 1);
        Ok(())
    }

    fn flush(&mut self) -> WriterResult {
        Ok(())
    }

    fn is_applicable(&self) -> bool {
        self.shown < self.rows
    }
}
