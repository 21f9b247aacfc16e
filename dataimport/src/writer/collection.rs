//! Fan-out of data sets to registered writer plugins.

use super::DataSetWriter;
use crate::dataset::DataSet;
use crate::error::WriterResult;

/// Ordered set of writer plugins.
///
/// Plugins run in registration order. Applicability is asked on every call
/// and never cached. The first plugin error aborts the call and is returned
/// as is; remaining plugins are not invoked.
#[derive(Debug, Default)]
pub struct DataSetWriterCollection {
    writers: Vec<DataSetWriter>,
}

impl DataSetWriterCollection {
    pub fn new(writers: Vec<DataSetWriter>) -> Self {
        Self { writers }
    }

    /// Register a plugin after the existing ones.
    pub fn push(&mut self, writer: DataSetWriter) {
        self.writers.push(writer);
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    fn applicable(&mut self) -> impl Iterator<Item = &mut DataSetWriter> {
        self.writers.iter_mut().filter(|writer| writer.is_applicable())
    }

    /// Write `data_set` to every applicable plugin.
    pub fn write(&mut self, data_set: &DataSet) -> WriterResult {
        for writer in self.applicable() {
            writer.write(data_set)?;
        }
        Ok(())
    }

    /// Flush every applicable plugin.
    pub fn flush(&mut self) -> WriterResult {
        for writer in self.applicable() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl FromIterator<DataSetWriter> for DataSetWriterCollection {
    fn from_iter<I: IntoIterator<Item = DataSetWriter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DataKey, DataSetItem, Payload};
    use crate::writer::{DataSetItemWriterPlugin, DataSetWriterPlugin};
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Write(&'static str, Payload),
        Flush(&'static str),
    }

    type Journal = Rc<RefCell<Vec<Call>>>;

    struct RecordingWriter {
        name: &'static str,
        journal: Journal,
        applicable: Rc<Cell<bool>>,
        fail: bool,
    }

    impl RecordingWriter {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: journal.clone(),
                applicable: Rc::new(Cell::new(true)),
                fail: false,
            }
        }
    }

    impl DataSetWriterPlugin for RecordingWriter {
        fn write(&mut self, data_set: &DataSet) -> WriterResult {
            if self.fail {
                return Err(format!("{} rejected data set", self.name).into());
            }
            self.journal.borrow_mut().push(Call::Write(self.name, data_set.to_pairs()));
            Ok(())
        }

        fn flush(&mut self) -> WriterResult {
            self.journal.borrow_mut().push(Call::Flush(self.name));
            Ok(())
        }

        fn is_applicable(&self) -> bool {
            self.applicable.get()
        }
    }

    struct RecordingItemWriter {
        name: &'static str,
        journal: Journal,
    }

    impl DataSetItemWriterPlugin for RecordingItemWriter {
        fn write(&mut self, item: &DataSetItem) -> WriterResult {
            self.journal
                .borrow_mut()
                .push(Call::Write(self.name, item.payload().to_vec()));
            Ok(())
        }

        fn flush(&mut self) -> WriterResult {
            self.journal.borrow_mut().push(Call::Flush(self.name));
            Ok(())
        }
    }

    fn product() -> DataSet {
        DataSet::from_pairs([("sku", json!("A-1")), ("price", json!(9.5))])
    }

    #[test]
    fn test_skips_non_applicable_writer() {
        let journal = Journal::default();
        let second = RecordingWriter::new("second", &journal);
        second.applicable.set(false);

        let mut collection = DataSetWriterCollection::new(vec![
            DataSetWriter::data_set(RecordingWriter::new("first", &journal)),
            DataSetWriter::data_set(second),
            DataSetWriter::item(RecordingItemWriter {
                name: "third",
                journal: journal.clone(),
            }),
        ]);

        let ds = product();
        collection.write(&ds).unwrap();
        collection.flush().unwrap();

        assert_eq!(
            *journal.borrow(),
            vec![
                Call::Write("first", ds.to_pairs()),
                Call::Write("third", ds.to_pairs()),
                Call::Flush("first"),
                Call::Flush("third"),
            ]
        );
    }

    #[test]
    fn test_applicability_is_asked_per_data_set() {
        let journal = Journal::default();
        let gated = RecordingWriter::new("gated", &journal);
        let gate = gated.applicable.clone();
        let mut collection: DataSetWriterCollection =
            std::iter::once(DataSetWriter::data_set(gated)).collect();

        collection.write(&product()).unwrap();
        gate.set(false);
        collection.write(&product()).unwrap();
        collection.flush().unwrap();
        gate.set(true);
        collection.write(&product()).unwrap();

        let writes = journal
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Write(..)))
            .count();
        assert_eq!(writes, 2);
        assert!(!journal.borrow().contains(&Call::Flush("gated")));
    }

    #[test]
    fn test_item_writer_receives_full_snapshot() {
        let journal = Journal::default();
        let mut collection = DataSetWriterCollection::default();
        collection.push(DataSetWriter::item(RecordingItemWriter {
            name: "item",
            journal: journal.clone(),
        }));

        let mut ds = DataSet::new();
        ds.set(0usize, "x");
        ds.set("tags", json!(["a", "b"]));
        collection.write(&ds).unwrap();

        assert_eq!(
            journal.borrow()[0],
            Call::Write(
                "item",
                vec![
                    (DataKey::Index(0), json!("x")),
                    (DataKey::from("tags"), json!(["a", "b"])),
                ]
            )
        );
        // The data set is untouched
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_writer_error_stops_remaining_writers() {
        let journal = Journal::default();
        let mut failing = RecordingWriter::new("failing", &journal);
        failing.fail = true;

        let mut collection = DataSetWriterCollection::new(vec![
            DataSetWriter::data_set(RecordingWriter::new("first", &journal)),
            DataSetWriter::data_set(failing),
            DataSetWriter::data_set(RecordingWriter::new("last", &journal)),
        ]);

        let err = collection.write(&product()).unwrap_err();
        assert_eq!(err.to_string(), "failing rejected data set");
        assert_eq!(journal.borrow().len(), 1);
    }

    #[test]
    fn test_flush_without_writes() {
        let journal = Journal::default();
        let mut collection = DataSetWriterCollection::new(vec![
            DataSetWriter::data_set(RecordingWriter::new("a", &journal)),
            DataSetWriter::data_set(RecordingWriter::new("b", &journal)),
        ]);
        collection.flush().unwrap();
        assert_eq!(*journal.borrow(), vec![Call::Flush("a"), Call::Flush("b")]);
    }

    #[test]
    fn test_writes_precede_flush_in_source_order() {
        let journal = Journal::default();
        let mut collection = DataSetWriterCollection::new(vec![
            DataSetWriter::data_set(RecordingWriter::new("a", &journal)),
            DataSetWriter::data_set(RecordingWriter::new("b", &journal)),
        ]);

        let rows: Vec<DataSet> = (0..3).map(|i| DataSet::from_pairs([("n", i)])).collect();
        for ds in &rows {
            collection.write(ds).unwrap();
        }
        collection.flush().unwrap();

        let seen_by_b: Vec<Call> = journal
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Write("b", _) | Call::Flush("b")))
            .cloned()
            .collect();
        let mut expected: Vec<Call> = rows.iter().map(|ds| Call::Write("b", ds.to_pairs())).collect();
        expected.push(Call::Flush("b"));
        assert_eq!(seen_by_b, expected);
    }
}
