//! Pull-based data readers.
//!
//! A [`DataReader`] is a cursor over [`DataSet`]s: `rewind` to the first
//! eligible record, check `valid`, read `current`, advance with `next`.
//! [`DataReader::data_sets`] wraps that protocol in a std [`Iterator`].
//!
//! - [`csv`] - Delimited-text reader
//! - [`config`] - Its configuration
//! - [`encoding`] - Source encoding detection and field decoding

pub mod config;
pub mod csv;
pub mod encoding;

pub use self::config::{CsvFlags, CsvReaderConfiguration};
pub use self::csv::CsvReader;

use crate::dataset::DataSet;
use crate::error::ReaderResult;

/// Cursor over the data sets of a source.
///
/// Positioning is lazy: every method positions the reader on its first
/// eligible record if that has not happened yet.
pub trait DataReader {
    /// Reset to the first eligible record.
    fn rewind(&mut self) -> ReaderResult<()>;

    /// Whether the reader currently sits on a record.
    fn valid(&mut self) -> ReaderResult<bool>;

    /// The record at the present position. Does not advance.
    fn current(&mut self) -> ReaderResult<DataSet>;

    /// Advance by one record.
    fn next(&mut self) -> ReaderResult<()>;

    /// Zero-based position as seen by the consumer (after windowing).
    fn key(&self) -> usize;

    /// Total number of eligible records.
    fn count(&mut self) -> ReaderResult<usize>;

    /// Iterate from the first eligible record.
    ///
    /// Rewinds first and stops after yielding the first error.
    fn data_sets(&mut self) -> DataSets<'_, Self>
    where
        Self: Sized,
    {
        DataSets {
            reader: self,
            started: false,
            done: false,
        }
    }
}

/// A reader whose configuration can be replaced after construction.
pub trait ConfigurableDataReader: DataReader {
    type Configuration;

    /// Replace the configuration. The open source is discarded and reopened
    /// on the next positioning call.
    fn configure(&mut self, configuration: Self::Configuration) -> ReaderResult<()>;
}

/// Iterator returned by [`DataReader::data_sets`].
pub struct DataSets<'a, R: DataReader> {
    reader: &'a mut R,
    started: bool,
    done: bool,
}

impl<R: DataReader> DataSets<'_, R> {
    fn advance(&mut self) -> ReaderResult<Option<DataSet>> {
        if self.started {
            self.reader.next()?;
        } else {
            self.reader.rewind()?;
            self.started = true;
        }

        if !self.reader.valid()? {
            return Ok(None);
        }
        self.reader.current().map(Some)
    }
}

impl<R: DataReader> Iterator for DataSets<'_, R> {
    type Item = ReaderResult<DataSet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(data_set)) => Some(Ok(data_set)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<R: DataReader> std::iter::FusedIterator for DataSets<'_, R> {}
