//! Generic record type shared by every collection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WorldhireError};

/// A single entity in a collection.
///
/// Every record carries a string `id`; all other fields are
/// collection-specific and kept as raw JSON. The id is fixed at
/// construction and never touched by [`Record::merge`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    /// Creates an empty record with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builds a record from a JSON object with a string `id` field.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(mut object) => {
                let id = match object.remove("id") {
                    Some(Value::String(id)) => id,
                    Some(other) => {
                        return Err(WorldhireError::InvalidRecord(format!(
                            "id must be a string, got {}",
                            other
                        )));
                    }
                    None => {
                        return Err(WorldhireError::InvalidRecord(
                            "record has no id field".to_string(),
                        ));
                    }
                };
                Ok(Self { id, fields: object })
            }
            other => Err(WorldhireError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Serializes any typed entity into a record.
    pub fn from_entity<T: Serialize>(entity: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(entity)?)
    }

    /// Deserializes this record into a typed entity.
    pub fn to_entity<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if field == "id" {
            return None;
        }
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Sets a field. Writes to `id` are ignored.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        if field != "id" {
            self.fields.insert(field, value.into());
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Whether `field` equals `value`. The `id` field is matchable too.
    pub fn matches(&self, field: &str, value: &Value) -> bool {
        if field == "id" {
            return value.as_str() == Some(self.id.as_str());
        }
        self.fields.get(field) == Some(value)
    }

    /// Shallow merge: every key in `patch` overwrites, all others are kept.
    /// An `id` key in the patch is ignored.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_requires_string_id() {
        assert!(Record::from_value(json!({"name": "x"})).is_err());
        assert!(Record::from_value(json!({"id": 7})).is_err());
        assert!(Record::from_value(json!([1, 2])).is_err());

        let record = Record::from_value(json!({"id": "r1", "name": "x"})).unwrap();
        assert_eq!(record.id(), "r1");
        assert_eq!(record.get_str("name"), Some("x"));
    }

    #[test]
    fn test_merge_is_shallow_and_keeps_id() {
        let mut record = Record::new("r1").with("a", 1).with("b", 2);
        let patch = json!({"b": 3, "id": "hijack"});
        record.merge(patch.as_object().unwrap());

        assert_eq!(record.id(), "r1");
        assert_eq!(record.to_value(), json!({"id": "r1", "a": 1, "b": 3}));
    }

    #[test]
    fn test_serde_flattens_fields() {
        let record = Record::new("r1").with("status", "active");
        let text = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&text).unwrap();
        assert_eq!(back, record);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": "r1", "status": "active"})
        );
    }

    #[test]
    fn test_matches_id_and_fields() {
        let record = Record::new("r1").with("email", "a@b.c");
        assert!(record.matches("id", &json!("r1")));
        assert!(record.matches("email", &json!("a@b.c")));
        assert!(!record.matches("email", &json!("other")));
        assert!(!record.matches("missing", &json!(null)));
    }
}
