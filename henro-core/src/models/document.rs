use serde::Serialize;
use std::collections::BTreeMap;

use super::value::Value;

/// A keyless document body: field name to value, sorted by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn with_field(mut self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites() {
        let mut doc = Document::new();
        doc.insert("name", Value::from("a"));
        doc.insert("name", Value::from("b"));
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.get("name"), Some(&Value::from("b")));
    }

    #[test]
    fn test_fields_are_sorted() {
        let doc = Document::new()
            .with_field("prefecture", Value::from("徳島県"))
            .with_field("address", Value::from("徳島県鳴門市"))
            .with_field("id", Value::Integer(1));
        let names: Vec<&str> = doc.fields().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["address", "id", "prefecture"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let doc = Document::new().with_field("id", Value::Integer(1));
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            serde_json::json!({"id": 1})
        );
    }
}
