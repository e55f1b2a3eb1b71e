//! Row encoding
//!
//! The engine hands back dynamically typed values whose kinds are only known at runtime.
//! `encode_value` is the one place that switches on them.

use rusqlite::types::ValueRef;
use serde::ser::{Serialize, Serializer};

/// A transport-safe cell value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum RowValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
}

impl From<bool> for RowValue {
    fn from(value: bool) -> Self {
        RowValue::Boolean(value)
    }
}

impl From<i64> for RowValue {
    fn from(value: i64) -> Self {
        RowValue::Integer(value)
    }
}

impl From<f64> for RowValue {
    fn from(value: f64) -> Self {
        RowValue::Float(value)
    }
}

impl From<&str> for RowValue {
    fn from(value: &str) -> Self {
        RowValue::Text(value.to_string())
    }
}

impl RowValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RowValue::Null)
    }

    /// Plain rendering for terminal tables
    pub fn display(&self) -> String {
        match self {
            RowValue::Null => "NULL".to_string(),
            RowValue::Integer(v) => v.to_string(),
            RowValue::Float(v) => v.to_string(),
            RowValue::Text(v) => v.clone(),
            RowValue::Boolean(v) => v.to_string(),
        }
    }
}

/// Convert one engine value.
///
/// Blobs are rendered as their UTF-8 text; invalid sequences become U+FFFD.
pub fn encode_value(value: ValueRef<'_>) -> RowValue {
    match value {
        ValueRef::Null => RowValue::Null,
        ValueRef::Integer(v) => RowValue::Integer(v),
        ValueRef::Real(v) => RowValue::Float(v),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            RowValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// One result row: column name to value, in result-set column order.
///
/// Serializes as a JSON object. Column names are unique; inserting an existing name
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, RowValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: RowValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<'a> FromIterator<(&'a str, ValueRef<'a>)> for Row {
    fn from_iter<I: IntoIterator<Item = (&'a str, ValueRef<'a>)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.insert(name, encode_value(value));
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(n, v)| (n, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blob_is_rendered_as_text() {
        assert_eq!(encode_value(ValueRef::Blob(b"hello")), RowValue::Text("hello".into()));
        assert_eq!(
            encode_value(ValueRef::Blob(&[0x66, 0x6f, 0xff])),
            RowValue::Text("fo\u{fffd}".into())
        );
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(encode_value(ValueRef::Integer(-7)), RowValue::Integer(-7));
        assert_eq!(encode_value(ValueRef::Real(1.5)), RowValue::Float(1.5));
        assert_eq!(encode_value(ValueRef::Text(b"abc")), RowValue::Text("abc".into()));
        assert!(encode_value(ValueRef::Null).is_null());
    }

    #[test]
    fn test_null_stays_distinguishable() {
        let row: Row = [
            ("missing", ValueRef::Null),
            ("literal", ValueRef::Text(b"null")),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value, json!({"missing": null, "literal": "null"}));
        assert!(value.as_object().unwrap().contains_key("missing"));
    }

    #[test]
    fn test_row_preserves_column_order_and_replaces_duplicates() {
        let mut row = Row::new();
        row.insert("id", RowValue::Integer(1));
        row.insert("name", "a".into());
        row.insert("id", RowValue::Integer(2));

        assert_eq!(row.len(), 2);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"id":2,"name":"a"}"#);
    }

    #[test]
    fn test_boolean_serializes_as_json_bool() {
        let mut row = Row::new();
        row.insert("flag", true.into());
        assert_eq!(serde_json::to_value(&row).unwrap(), json!({"flag": true}));
        assert_eq!(RowValue::Boolean(false).display(), "false");
    }
}
