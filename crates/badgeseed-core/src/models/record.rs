use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier generated by the backend for an inserted row.
///
/// Tables may use integer or UUID keys, so the id is kept in the JSON shape
/// the backend returned and sent back unchanged when used as a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an id out of a JSON value. Nulls, floats and structured values
    /// are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Read `column` from a returned row.
    pub fn from_row(row: &Value, column: &str) -> Option<Self> {
        row.get(column).and_then(Self::from_value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

/// Read a text field from a source record.
///
/// Requirement labels such as `1` are sometimes written as JSON numbers, so
/// numbers are accepted and rendered as text.
pub(crate) fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
