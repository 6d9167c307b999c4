//! Schema-less entity record as returned by the OpenAlex API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entity (work, author, institution, ...) as an opaque JSON object.
///
/// Field access never assumes presence: every accessor returns `Option`,
/// since upstream schemas drift between entity types and over time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build from an arbitrary JSON value; `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Entity ID (e.g. "https://openalex.org/W2741809807")
    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    /// String field; `None` when missing, null, or not a string
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn i64_field(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }

    /// List of strings; non-string elements are dropped.
    ///
    /// `None` when the field is missing or not an array, so callers can
    /// tell a schema gap from an empty list.
    pub fn str_list(&self, field: &str) -> Option<Vec<&str>> {
        let items = self.0.get(field)?.as_array()?;
        Some(items.iter().filter_map(Value::as_str).collect())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> EntityRecord {
        EntityRecord::from_value(v).unwrap()
    }

    #[test]
    fn from_value_rejects_non_object() {
        assert!(EntityRecord::from_value(json!([1, 2])).is_none());
        assert!(EntityRecord::from_value(json!("W1")).is_none());
        assert!(EntityRecord::from_value(json!({})).is_some());
    }

    #[test]
    fn id_and_str_field() {
        let r = record(json!({"id": "https://openalex.org/W1", "title": null, "year": 2020}));
        assert_eq!(r.id(), Some("https://openalex.org/W1"));
        assert_eq!(r.str_field("title"), None);
        assert_eq!(r.str_field("year"), None);
        assert_eq!(r.i64_field("year"), Some(2020));
    }

    #[test]
    fn str_list_distinguishes_missing_from_empty() {
        let r = record(json!({"referenced_works": [], "other": "x"}));
        assert_eq!(r.str_list("referenced_works"), Some(vec![]));
        assert_eq!(r.str_list("missing"), None);
        assert_eq!(r.str_list("other"), None);
    }

    #[test]
    fn str_list_drops_non_strings() {
        let r = record(json!({"ids": ["W1", 7, null, "W2"]}));
        assert_eq!(r.str_list("ids"), Some(vec!["W1", "W2"]));
    }

    #[test]
    fn serializes_transparently() {
        let r = record(json!({"id": "W1"}));
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"id":"W1"}"#);
        let back: EntityRecord = serde_json::from_str(r#"{"id":"W1"}"#).unwrap();
        assert_eq!(back, r);
    }
}
