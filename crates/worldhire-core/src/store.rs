//! The aggregate demo store and the collaborators that fill and persist it.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::collection::CollectionName;
use crate::error::{Result, WorldhireError};
use crate::record::Record;

/// All collections of the demo dataset, persisted as one JSON document.
///
/// A `Store` value is always complete: every [`CollectionName`] has an
/// entry, possibly empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    collections: BTreeMap<CollectionName, Vec<Record>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::empty()
    }
}

impl Store {
    /// A store with every collection present and empty.
    pub fn empty() -> Self {
        Self {
            collections: CollectionName::all().map(|name| (name, Vec::new())).collect(),
        }
    }

    /// Assembles a store from fetched seed collections.
    ///
    /// Collections missing from `seeded` are created empty.
    pub fn from_collections(seeded: impl IntoIterator<Item = (CollectionName, Vec<Record>)>) -> Self {
        let mut store = Self::empty();
        for (name, records) in seeded {
            store.collections.insert(name, records);
        }
        store
    }

    /// Parses a persisted document.
    ///
    /// Every seeded collection must be present as an array of records.
    /// Collections added after the seed files (trainings, contracts, ...)
    /// default to empty when absent. Unknown keys are ignored.
    pub fn from_document(document: Value) -> Result<Self> {
        let object = match document {
            Value::Object(object) => object,
            other => {
                return Err(WorldhireError::InvalidRecord(format!(
                    "store document must be an object, got {}",
                    kind_of(&other)
                )));
            }
        };

        let mut store = Self::empty();
        let mut present = Vec::new();
        for (key, value) in object {
            let Ok(name) = CollectionName::from_str(&key) else {
                continue;
            };
            store.collections.insert(name, parse_records(name, value)?);
            present.push(name);
        }

        if let Some(missing) = CollectionName::seeded().find(|name| !present.contains(name)) {
            return Err(WorldhireError::InvalidRecord(format!(
                "store document is missing collection '{}'",
                missing
            )));
        }

        Ok(store)
    }

    pub fn to_document(&self) -> Value {
        let mut object = Map::new();
        for (name, records) in &self.collections {
            object.insert(
                name.to_string(),
                Value::Array(records.iter().map(Record::to_value).collect()),
            );
        }
        Value::Object(object)
    }

    pub fn collection(&self, name: CollectionName) -> &[Record] {
        self.collections
            .get(&name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn collection_mut(&mut self, name: CollectionName) -> &mut Vec<Record> {
        self.collections.entry(name).or_default()
    }

    /// Total number of records across all collections.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }
}

/// Parses a JSON array of records belonging to `name`.
pub fn parse_records(name: CollectionName, value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| {
                Record::from_value(item)
                    .map_err(|e| WorldhireError::seed(name.to_string(), e.to_string()))
            })
            .collect(),
        other => Err(WorldhireError::seed(
            name.to_string(),
            format!("expected an array of records, got {}", kind_of(&other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A local persistent key-value slot holding one JSON document per key.
///
/// `load` never fails: an absent or unparseable payload is reported as
/// `None` and logged by the implementation.
#[async_trait]
pub trait PersistentSlot: Send + Sync {
    async fn load(&self, key: &str) -> Option<Value>;

    /// Overwrites the slot with `value`.
    async fn save(&self, key: &str, value: &Value) -> Result<()>;

    /// Removes the slot. Clearing an absent slot is not an error.
    async fn clear(&self, key: &str) -> Result<()>;
}

/// Source of the static seed documents, one array of records per collection.
#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn fetch(&self, collection: CollectionName) -> Result<Vec<Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded_document() -> Value {
        let mut object = Map::new();
        for name in CollectionName::seeded() {
            object.insert(name.to_string(), json!([]));
        }
        Value::Object(object)
    }

    #[test]
    fn test_empty_store_has_every_collection() {
        let store = Store::empty();
        let document = store.to_document();
        assert_eq!(document.as_object().unwrap().len(), CollectionName::all().count());
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn test_from_document_fills_late_collections() {
        let mut document = seeded_document();
        document["users"] = json!([{"id": "u1", "email": "a@b.c"}]);

        let store = Store::from_document(document).unwrap();
        assert_eq!(store.collection(CollectionName::Users).len(), 1);
        assert!(store.collection(CollectionName::Remittances).is_empty());
    }

    #[test]
    fn test_from_document_rejects_missing_seeded_collection() {
        let mut document = seeded_document();
        document.as_object_mut().unwrap().remove("jobs");
        assert!(Store::from_document(document).is_err());
    }

    #[test]
    fn test_from_document_rejects_bad_shapes() {
        assert!(Store::from_document(json!([1, 2, 3])).is_err());

        let mut document = seeded_document();
        document["jobs"] = json!({"not": "an array"});
        assert!(Store::from_document(document).is_err());
    }

    #[test]
    fn test_document_roundtrip_preserves_order() {
        let store = Store::from_collections(vec![(
            CollectionName::Jobs,
            vec![Record::new("j2"), Record::new("j1")],
        )]);
        let back = Store::from_document(store.to_document()).unwrap();
        let ids: Vec<&str> = back
            .collection(CollectionName::Jobs)
            .iter()
            .map(Record::id)
            .collect();
        assert_eq!(ids, vec!["j2", "j1"]);
    }
}
