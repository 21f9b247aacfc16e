//! Data sets: one normalized imported row.
//!
//! - [`DataKey`] - Column name or zero-based column index
//! - [`DataSet`] - Ordered key/value container with strict key presence
//! - [`DataSetItem`] - Envelope handed to item writer plugins

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::{DataSetError, DataSetResult};

/// Ordered snapshot of a data set's key/value pairs.
pub type Payload = Vec<(DataKey, Value)>;

// =============================================================================
// Data Key
// =============================================================================

/// Key of a data set entry.
///
/// Rows read with a header are keyed by column name, rows read without one
/// by their column position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataKey {
    /// Zero-based column position.
    Index(usize),
    /// Column name.
    Name(String),
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Index(i) => write!(f, "{}", i),
            DataKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for DataKey {
    fn from(index: usize) -> Self {
        DataKey::Index(index)
    }
}

impl From<&str> for DataKey {
    fn from(name: &str) -> Self {
        DataKey::Name(name.to_string())
    }
}

impl From<String> for DataKey {
    fn from(name: String) -> Self {
        DataKey::Name(name)
    }
}

impl PartialEq<str> for DataKey {
    fn eq(&self, other: &str) -> bool {
        matches!(self, DataKey::Name(name) if name == other)
    }
}

impl PartialEq<String> for DataKey {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<usize> for DataKey {
    fn eq(&self, other: &usize) -> bool {
        matches!(self, DataKey::Index(i) if i == other)
    }
}

// =============================================================================
// Data Set
// =============================================================================

/// One imported row as an ordered key/value container.
///
/// Reads and deletes of absent keys fail with [`DataSetError::KeyNotFound`];
/// writes always succeed and keep the position of existing keys.
///
/// Lookups accept anything a [`DataKey`] can be compared with:
///
/// ```
/// use dataimport::dataset::DataSet;
///
/// let mut data_set = DataSet::new();
/// data_set.set("name", "Ada");
/// data_set.set(0usize, 36);
///
/// assert_eq!(data_set.get("name").unwrap(), "Ada");
/// assert_eq!(data_set.get(&0usize).unwrap(), 36);
/// assert!(data_set.get("age").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    entries: Payload,
}

impl DataSet {
    /// Create an empty data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a data set from key/value pairs. Repeated keys are upserted.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<DataKey>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut data_set = Self::new();
        for (key, value) in pairs {
            data_set.set(key, value);
        }
        data_set
    }

    /// Build a data set from pairs whose keys are known to be distinct.
    pub(crate) fn from_distinct_pairs(entries: Payload) -> Self {
        Self { entries }
    }

    fn position<K>(&self, key: &K) -> Option<usize>
    where
        K: ?Sized,
        DataKey: PartialEq<K>,
    {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn key_not_found<K: ?Sized + fmt::Display>(&self, key: &K) -> DataSetError {
        DataSetError::KeyNotFound {
            key: key.to_string(),
            available: self.entries.iter().map(|(k, _)| k.to_string()).collect(),
        }
    }

    /// Value stored under `key`.
    pub fn get<K>(&self, key: &K) -> DataSetResult<&Value>
    where
        K: ?Sized + fmt::Display,
        DataKey: PartialEq<K>,
    {
        match self.position(key) {
            Some(idx) => Ok(&self.entries[idx].1),
            None => Err(self.key_not_found(key)),
        }
    }

    /// Mutable access to the value stored under `key`.
    pub fn get_mut<K>(&mut self, key: &K) -> DataSetResult<&mut Value>
    where
        K: ?Sized + fmt::Display,
        DataKey: PartialEq<K>,
    {
        match self.position(key) {
            Some(idx) => Ok(&mut self.entries[idx].1),
            None => Err(self.key_not_found(key)),
        }
    }

    /// Insert or overwrite. New keys are appended.
    pub fn set(&mut self, key: impl Into<DataKey>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Whether `key` is present.
    pub fn has<K>(&self, key: &K) -> bool
    where
        K: ?Sized,
        DataKey: PartialEq<K>,
    {
        self.position(key).is_some()
    }

    /// Remove `key`.
    pub fn delete<K>(&mut self, key: &K) -> DataSetResult<()>
    where
        K: ?Sized + fmt::Display,
        DataKey: PartialEq<K>,
    {
        match self.position(key) {
            Some(idx) => {
                self.entries.remove(idx);
                Ok(())
            }
            None => Err(self.key_not_found(key)),
        }
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Alias of [`DataSet::len`].
    pub fn count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &DataKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate over entries in insertion order. Every call starts at the first key.
    pub fn iter(&self) -> impl Iterator<Item = (&DataKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Copy of all pairs in insertion order.
    pub fn to_pairs(&self) -> Payload {
        self.entries.clone()
    }

    /// Replace the whole content, returning the previous pairs.
    pub fn exchange(&mut self, pairs: Payload) -> Payload {
        let replacement = Self::from_pairs(pairs);
        std::mem::replace(&mut self.entries, replacement.entries)
    }
}

impl<K: Into<DataKey>, V: Into<Value>> FromIterator<(K, V)> for DataSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = (&'a DataKey, &'a Value);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (DataKey, Value)>,
        fn(&'a (DataKey, Value)) -> (&'a DataKey, &'a Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let split: fn(&'a (DataKey, Value)) -> (&'a DataKey, &'a Value) = |(k, v)| (k, v);
        self.entries.iter().map(split)
    }
}

/// Serialize pairs as a JSON-style object; index keys become strings.
fn serialize_pairs<S: Serializer>(pairs: &[(DataKey, Value)], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(&key.to_string(), value)?;
    }
    map.end()
}

impl Serialize for DataSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pairs(&self.entries, serializer)
    }
}

// =============================================================================
// Data Set Item (writer envelope)
// =============================================================================

/// Envelope carrying a data set's snapshot to item writer plugins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSetItem {
    payload: Payload,
}

/// Serializes borrowed pairs as an object, keeping their order.
pub struct PayloadObject<'a>(pub &'a [(DataKey, Value)]);

impl Serialize for PayloadObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_pairs(self.0, serializer)
    }
}

impl DataSetItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_payload(&mut self, payload: Payload) -> &mut Self {
        self.payload = payload;
        self
    }

    pub fn payload(&self) -> &[(DataKey, Value)] {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }
}

impl From<&DataSet> for DataSetItem {
    fn from(data_set: &DataSet) -> Self {
        let mut item = DataSetItem::new();
        item.set_payload(data_set.to_pairs());
        item
    }
}

impl Serialize for DataSetItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DataSetItem", 1)?;
        state.serialize_field("payload", &PayloadObject(&self.payload))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DataSet {
        DataSet::from_pairs([("name", json!("Ada")), ("age", json!("36"))])
    }

    #[test]
    fn test_get_and_set() {
        let mut ds = sample();
        assert_eq!(ds.get("name").unwrap(), "Ada");

        ds.set("name", "Grace");
        assert_eq!(ds.get("name").unwrap(), "Grace");
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn test_get_missing_key_lists_available_keys() {
        let ds = sample();
        let err = ds.get("email").unwrap_err();
        assert_eq!(
            err,
            DataSetError::KeyNotFound {
                key: "email".into(),
                available: vec!["name".into(), "age".into()],
            }
        );
    }

    #[test]
    fn test_delete() {
        let mut ds = sample();
        ds.delete("name").unwrap();
        assert!(!ds.has("name"));
        assert_eq!(ds.count(), 1);

        assert!(matches!(ds.delete("name"), Err(DataSetError::KeyNotFound { .. })));
    }

    #[test]
    fn test_overwrite_keeps_insertion_order() {
        let mut ds = sample();
        ds.set("city", "London");
        ds.set("name", "Grace");

        let keys: Vec<String> = ds.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["name", "age", "city"]);
    }

    #[test]
    fn test_index_keys_are_distinct_from_names() {
        let mut ds = DataSet::new();
        ds.set(0usize, "first");
        ds.set("0", "named");

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(&0usize).unwrap(), "first");
        assert_eq!(ds.get("0").unwrap(), "named");
        assert!(ds.get(&1usize).is_err());
    }

    #[test]
    fn test_count_tracks_sets_and_deletes() {
        let mut ds = DataSet::new();
        for key in ["a", "b", "c", "a"] {
            ds.set(key, true);
        }
        ds.delete("b").unwrap();
        assert_eq!(ds.count(), 2);
    }

    #[test]
    fn test_iteration_restarts() {
        let ds = sample();
        let first: Vec<_> = ds.iter().map(|(k, _)| k.clone()).collect();
        let second: Vec<_> = (&ds).into_iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(first, second);
        assert_eq!(first[0], DataKey::from("name"));
    }

    #[test]
    fn test_exchange_returns_previous_pairs() {
        let mut ds = sample();
        let old = ds.exchange(vec![(DataKey::from("sku"), json!("A-1"))]);

        assert_eq!(old.len(), 2);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get("sku").unwrap(), "A-1");
    }

    #[test]
    fn test_to_pairs_is_a_copy() {
        let mut ds = sample();
        let snapshot = ds.to_pairs();
        ds.set("name", "Grace");
        assert_eq!(snapshot[0].1, json!("Ada"));
    }

    #[test]
    fn test_serialize_as_object() {
        let mut ds = sample();
        ds.set(3usize, json!([1, 2]));
        let value = serde_json::to_value(&ds).unwrap();
        assert_eq!(value, json!({"name": "Ada", "age": "36", "3": [1, 2]}));
    }

    #[test]
    fn test_item_envelope() {
        let ds = sample();
        let item = DataSetItem::from(&ds);
        assert_eq!(item.payload(), ds.to_pairs().as_slice());

        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value, json!({"payload": {"name": "Ada", "age": "36"}}));
    }
}
