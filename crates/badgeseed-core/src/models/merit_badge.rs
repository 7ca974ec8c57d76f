use serde_json::{json, Value};

use crate::schema::{
    BADGE_DESCRIPTION, BADGE_EAGLE_REQUIRED, BADGE_NAME, DEPARTMENT_ID, DEPARTMENT_NAME,
    REQUIREMENTS,
};

use super::record::{text_field, RecordId};
use super::requirement::{count_all, Requirement};

/// A merit badge definition as read from a single badge file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeritBadge {
    pub name: String,
    pub description: String,
    pub eagle_required: bool,
    /// Name of the owning department. Resolved to a remote id at seed time.
    pub department_name: String,
    pub requirements: Vec<Requirement>,
    pub id: Option<RecordId>,
}

impl MeritBadge {
    /// Build a badge from a source record.
    ///
    /// `badge_name`, `badge_desc`, `eagle_badge`, `dpmt_name` and
    /// `requirements` must all be present, otherwise `None` is returned and
    /// the caller drops the record. An empty or null requirement list is
    /// accepted.
    pub fn from_json(record: &Value) -> Option<Self> {
        let name = text_field(record, BADGE_NAME)?;
        let description = text_field(record, BADGE_DESCRIPTION)?;
        let eagle_required = record.get(BADGE_EAGLE_REQUIRED)?.as_bool()?;
        let department_name = text_field(record, DEPARTMENT_NAME)?;

        let requirements = match record.get(REQUIREMENTS)? {
            Value::Null => Vec::new(),
            list => Requirement::list_from_json(list.as_array()?),
        };

        Some(Self {
            name,
            description,
            eagle_required,
            department_name,
            requirements,
            id: None,
        })
    }

    /// Key used to group badges under their department.
    pub fn department_key(&self) -> String {
        self.department_name.to_uppercase()
    }

    /// Total number of requirement nodes, nested ones included.
    pub fn requirement_count(&self) -> usize {
        count_all(&self.requirements)
    }

    /// Row body for the badge table.
    pub fn to_row(&self, department_id: &RecordId) -> Value {
        json!({
            BADGE_NAME: self.name,
            BADGE_DESCRIPTION: self.description,
            BADGE_EAGLE_REQUIRED: self.eagle_required,
            DEPARTMENT_ID: department_id,
        })
    }
}
