//! Data set writer plugins.
//!
//! Two plugin shapes coexist:
//!
//! - [`DataSetWriterPlugin`] receives the [`DataSet`] itself
//! - [`DataSetItemWriterPlugin`] receives a [`DataSetItem`] envelope whose
//!   payload is the data set's full key/value snapshot
//!
//! Both may opt out of a run through `is_applicable`, which is asked again
//! for every data set. [`DataSetWriterCollection`] fans a data set out to all
//! registered plugins.

pub mod collection;
pub mod plugins;

pub use collection::DataSetWriterCollection;
pub use plugins::{JsonLinesWriter, PreviewWriter};

use crate::dataset::{DataSet, DataSetItem};
use crate::error::WriterResult;

/// Plugin that consumes data sets directly.
pub trait DataSetWriterPlugin {
    fn write(&mut self, data_set: &DataSet) -> WriterResult;

    fn flush(&mut self) -> WriterResult;

    /// Whether the plugin takes part in the current run.
    fn is_applicable(&self) -> bool {
        true
    }
}

/// Plugin that consumes the item envelope.
pub trait DataSetItemWriterPlugin {
    fn write(&mut self, item: &DataSetItem) -> WriterResult;

    fn flush(&mut self) -> WriterResult;

    /// Whether the plugin takes part in the current run.
    fn is_applicable(&self) -> bool {
        true
    }
}

/// A registered plugin of either shape.
pub enum DataSetWriter {
    DataSet(Box<dyn DataSetWriterPlugin>),
    Item(Box<dyn DataSetItemWriterPlugin>),
}

impl DataSetWriter {
    pub fn data_set(plugin: impl DataSetWriterPlugin + 'static) -> Self {
        DataSetWriter::DataSet(Box::new(plugin))
    }

    pub fn item(plugin: impl DataSetItemWriterPlugin + 'static) -> Self {
        DataSetWriter::Item(Box::new(plugin))
    }

    pub fn is_applicable(&self) -> bool {
        match self {
            DataSetWriter::DataSet(plugin) => plugin.is_applicable(),
            DataSetWriter::Item(plugin) => plugin.is_applicable(),
        }
    }

    /// Hand `data_set` to the plugin in the shape it expects.
    pub fn write(&mut self, data_set: &DataSet) -> WriterResult {
        match self {
            DataSetWriter::DataSet(plugin) => plugin.write(data_set),
            DataSetWriter::Item(plugin) => plugin.write(&DataSetItem::from(data_set)),
        }
    }

    pub fn flush(&mut self) -> WriterResult {
        match self {
            DataSetWriter::DataSet(plugin) => plugin.flush(),
            DataSetWriter::Item(plugin) => plugin.flush(),
        }
    }
}

impl std::fmt::Debug for DataSetWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSetWriter::DataSet(_) => f.write_str("DataSetWriter::DataSet(..)"),
            DataSetWriter::Item(_) => f.write_str("DataSetWriter::Item(..)"),
        }
    }
}
