use serde_json::{json, Value};

use crate::schema::DEPARTMENT_NAME;

use super::record::text_field;

/// A camp department. The remote id is not kept here; badges look it up by
/// name when they are seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub name: String,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Build a department from a `{"dpmt_name": ...}` record.
    /// Returns `None` when the name is missing or blank.
    pub fn from_json(record: &Value) -> Option<Self> {
        let name = text_field(record, DEPARTMENT_NAME)?;
        if name.trim().is_empty() {
            return None;
        }
        Some(Self { name })
    }

    /// Row body for the department table.
    pub fn to_row(&self) -> Value {
        json!({ DEPARTMENT_NAME: self.name })
    }
}
