//! Delimited-text data reader.
//!
//! [`CsvReader`] walks a CSV file one data set at a time. The header row (if
//! enabled) names the keys of every data set; without a header, keys are
//! column positions.
//!
//! # Windowing
//! The offset skips data rows after the header; the limit caps the number of
//! data sets yielded after the offset. For `N` data rows the reader yields
//! `min(N - offset, limit)` data sets, or none when `offset >= N`.
//!
//! # Malformed rows
//! A row whose width differs from the header is only rejected when it is
//! materialized by [`DataReader::current`]. Rows discarded by the offset are
//! never materialized, so their width is not checked. The cursor stays on a
//! rejected row; `next` moves past it.
//!
//! # Encoding
//! Fields are read as bytes and decoded with the configured encoding. Without
//! one, the encoding is guessed from the head of the file on every rewind.

use encoding_rs::UTF_8;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;

use super::config::CsvReaderConfiguration;
use super::encoding::{self, FieldDecoder};
use super::{ConfigurableDataReader, DataReader};
use crate::dataset::{DataKey, DataSet};
use crate::error::{ReaderError, ReaderResult};
use crate::logs::{log_info_indent, log_warning};

/// An open source with the row the cursor sits on.
#[derive(Debug)]
struct OpenSource {
    reader: csv::Reader<File>,
    row: csv::ByteRecord,
}

#[derive(Debug)]
enum CursorState {
    /// No source handle; the next positioning call opens one.
    Unopened,
    Positioned(OpenSource),
    /// End of source or limit reached; the handle is released.
    Exhausted,
}

/// Header row, resolved once per opened source.
#[derive(Debug)]
struct Header {
    names: Vec<String>,
    /// Distinct names in first-occurrence order.
    keys: Vec<DataKey>,
    /// Index into `keys` for every column.
    slots: Vec<usize>,
}

impl Header {
    fn new(names: Vec<String>) -> Self {
        let (keys, slots) = {
            let mut keys = Vec::with_capacity(names.len());
            let mut seen: HashMap<&str, usize> = HashMap::with_capacity(names.len());
            let slots: Vec<usize> = names
                .iter()
                .map(|name| {
                    *seen.entry(name.as_str()).or_insert_with(|| {
                        keys.push(DataKey::from(name.as_str()));
                        keys.len() - 1
                    })
                })
                .collect();
            (keys, slots)
        };
        Self { names, keys, slots }
    }
}

/// Pull-based reader over a delimited file.
///
/// ```no_run
/// use dataimport::reader::{CsvReader, CsvReaderConfiguration, DataReader};
///
/// let config = CsvReaderConfiguration::new("products.csv").with_limit(Some(100));
/// let mut reader = CsvReader::new(config)?;
/// for data_set in reader.data_sets() {
///     let data_set = data_set?;
///     println!("{}", data_set.get("sku")?);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct CsvReader {
    configuration: CsvReaderConfiguration,
    state: CursorState,
    header: Option<Header>,
    decoder: FieldDecoder,
    position: usize,
    cached_count: Option<usize>,
}

impl CsvReader {
    /// Open the configured source and position on the first eligible record.
    ///
    /// Fails with [`ReaderError::Open`] when the file cannot be opened.
    pub fn new(configuration: CsvReaderConfiguration) -> ReaderResult<Self> {
        configuration.validate()?;
        let mut reader = Self {
            configuration,
            state: CursorState::Unopened,
            header: None,
            decoder: FieldDecoder::default(),
            position: 0,
            cached_count: None,
        };
        reader.rewind()?;
        Ok(reader)
    }

    pub fn configuration(&self) -> &CsvReaderConfiguration {
        &self.configuration
    }

    /// Column names of the active header, once the source is opened.
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_ref().map(|h| h.names.as_slice())
    }

    /// Encoding fields are decoded with, once the source is opened.
    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        self.decoder.encoding()
    }

    fn open_error(&self, source: std::io::Error) -> ReaderError {
        ReaderError::Open {
            path: self.configuration.file_name.to_path_buf(),
            source,
        }
    }

    fn open(&self) -> ReaderResult<File> {
        File::open(&self.configuration.file_name).map_err(|e| self.open_error(e))
    }

    /// Configured decoder, or one for the encoding guessed from the head of `file`.
    fn decoder_for(&self, file: &mut File) -> ReaderResult<FieldDecoder> {
        if let Some(decoder) = self.configuration.field_decoder()? {
            return Ok(decoder);
        }
        let sample = encoding::sample(file).map_err(|e| self.open_error(e))?;
        let detected = encoding::detect(&sample);
        if detected != UTF_8 {
            log_warning(format!(
                "{} is not UTF-8, decoding as {}",
                self.configuration.file_name.display(),
                detected.name()
            ));
        }
        Ok(FieldDecoder::detected(detected))
    }

    /// Reopen the source, consume the header and skip the offset.
    fn position_at_start(&mut self) -> ReaderResult<()> {
        // Release the previous handle before acquiring a new one.
        self.state = CursorState::Unopened;
        self.header = None;
        self.position = 0;

        let mut file = self.open()?;
        self.decoder = self.decoder_for(&mut file)?;
        let mut reader = self.configuration.reader_builder()?.from_reader(file);
        log_info_indent(format!("Reading {}", self.configuration.file_name.display()), 1);

        if self.configuration.has_header {
            match read_row(&mut reader)? {
                Some(row) => {
                    let decoder = self.decoder;
                    let names = row.iter().map(|f| decoder.decode(f).into_owned()).collect();
                    self.header = Some(Header::new(names));
                }
                None => {
                    self.state = CursorState::Exhausted;
                    return Ok(());
                }
            }
        }

        for _ in 0..self.configuration.offset.unwrap_or(0) {
            if read_row(&mut reader)?.is_none() {
                self.state = CursorState::Exhausted;
                return Ok(());
            }
        }

        self.load_row(reader)
    }

    /// Read the row at `self.position`, or stop if the window is exhausted.
    fn load_row(&mut self, mut reader: csv::Reader<File>) -> ReaderResult<()> {
        if self.limit_reached() {
            self.state = CursorState::Exhausted;
            return Ok(());
        }
        self.state = match read_row(&mut reader)? {
            Some(row) => CursorState::Positioned(OpenSource { reader, row }),
            None => CursorState::Exhausted,
        };
        Ok(())
    }

    fn limit_reached(&self) -> bool {
        matches!(self.configuration.limit, Some(limit) if self.position >= limit)
    }

    fn ensure_positioned(&mut self) -> ReaderResult<()> {
        if matches!(self.state, CursorState::Unopened) {
            self.position_at_start()?;
        }
        Ok(())
    }

    /// Data rows in the whole source, header excluded. Uses its own handle.
    fn scan_rows(&self) -> ReaderResult<usize> {
        let mut reader = self.configuration.reader_builder()?.from_reader(self.open()?);
        let mut row = csv::ByteRecord::new();
        let mut rows = 0usize;
        while reader.read_byte_record(&mut row)? {
            rows += 1;
        }
        if self.configuration.has_header {
            rows = rows.saturating_sub(1);
        }
        Ok(rows)
    }
}

impl DataReader for CsvReader {
    fn rewind(&mut self) -> ReaderResult<()> {
        self.position_at_start()
    }

    fn valid(&mut self) -> ReaderResult<bool> {
        self.ensure_positioned()?;
        Ok(matches!(self.state, CursorState::Positioned(_)))
    }

    fn current(&mut self) -> ReaderResult<DataSet> {
        self.ensure_positioned()?;
        match &self.state {
            CursorState::Positioned(source) => materialize(self.header.as_ref(), self.decoder, &source.row),
            _ => Err(ReaderError::NoCurrentDataSet {
                position: self.position,
            }),
        }
    }

    fn next(&mut self) -> ReaderResult<()> {
        self.ensure_positioned()?;
        // A read error leaves the reader exhausted.
        match std::mem::replace(&mut self.state, CursorState::Exhausted) {
            CursorState::Positioned(source) => {
                self.position += 1;
                self.load_row(source.reader)
            }
            other => {
                self.state = other;
                Ok(())
            }
        }
    }

    fn key(&self) -> usize {
        self.position
    }

    fn count(&mut self) -> ReaderResult<usize> {
        if let Some(count) = self.cached_count {
            return Ok(count);
        }
        let rows = self.scan_rows()?;
        let count = window_len(rows, self.configuration.offset, self.configuration.limit);
        self.cached_count = Some(count);
        Ok(count)
    }
}

impl ConfigurableDataReader for CsvReader {
    type Configuration = CsvReaderConfiguration;

    fn configure(&mut self, configuration: CsvReaderConfiguration) -> ReaderResult<()> {
        configuration.validate()?;
        self.configuration = configuration;
        self.state = CursorState::Unopened;
        self.header = None;
        self.position = 0;
        self.cached_count = None;
        Ok(())
    }
}

/// Number of data sets an offset/limit window leaves out of `rows`.
pub fn window_len(rows: usize, offset: Option<usize>, limit: Option<usize>) -> usize {
    let remaining = rows.saturating_sub(offset.unwrap_or(0));
    match limit {
        Some(limit) => remaining.min(limit),
        None => remaining,
    }
}

fn read_row(reader: &mut csv::Reader<File>) -> ReaderResult<Option<csv::ByteRecord>> {
    let mut row = csv::ByteRecord::new();
    if reader.read_byte_record(&mut row)? {
        Ok(Some(row))
    } else {
        Ok(None)
    }
}

fn materialize(header: Option<&Header>, decoder: FieldDecoder, row: &csv::ByteRecord) -> ReaderResult<DataSet> {
    let text = |field: &[u8]| Value::from(decoder.decode(field).into_owned());
    match header {
        Some(header) => {
            if header.names.len() != row.len() {
                return Err(ReaderError::HeaderDataSetMismatch {
                    line: row.position().map_or(0, |p| p.line()),
                    header_len: header.names.len(),
                    row_len: row.len(),
                });
            }
            // Repeated column names keep their first position and last value.
            let mut values = vec![Value::Null; header.keys.len()];
            for (slot, field) in header.slots.iter().zip(row.iter()) {
                values[*slot] = text(field);
            }
            Ok(DataSet::from_distinct_pairs(header.keys.iter().cloned().zip(values).collect()))
        }
        None => Ok(DataSet::from_distinct_pairs(
            row.iter().enumerate().map(|(i, field)| (DataKey::Index(i), text(field))).collect(),
        )),
    }
}
