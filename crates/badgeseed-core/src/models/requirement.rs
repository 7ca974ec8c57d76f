use serde_json::{json, Map, Value};

use crate::schema::{
    BADGE_ID, REQUIREMENTS, REQUIREMENT_DESCRIPTION, REQUIREMENT_IDENTIFIER, REQUIREMENT_PARENT_ID,
};

use super::record::{text_field, RecordId};

/// One node of a merit badge requirement tree.
///
/// The three id fields stay `None` until the node has been inserted; they are
/// filled in from the row the backend returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    /// Short external label such as `4a`.
    pub identifier: String,
    pub description: String,
    pub requirements: Vec<Requirement>,
    pub parent_id: Option<RecordId>,
    pub badge_id: Option<RecordId>,
    pub id: Option<RecordId>,
}

impl Requirement {
    pub fn new(
        identifier: impl Into<String>,
        description: impl Into<String>,
        requirements: Vec<Requirement>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            requirements,
            parent_id: None,
            badge_id: None,
            id: None,
        }
    }

    /// Build a requirement (and its nested requirements) from a source record.
    ///
    /// Returns `None` unless both `rqmt_idnf` and `rqmt_desc` are present.
    /// A missing or null `requirements` key means no children; a value that
    /// is not an array rejects the record.
    pub fn from_json(record: &Value) -> Option<Self> {
        let identifier = text_field(record, REQUIREMENT_IDENTIFIER)?;
        let description = text_field(record, REQUIREMENT_DESCRIPTION)?;

        let requirements = match record.get(REQUIREMENTS) {
            None | Some(Value::Null) => Vec::new(),
            Some(nested) => Self::list_from_json(nested.as_array()?),
        };

        Some(Self::new(identifier, description, requirements))
    }

    /// Parse a list of requirement records, dropping the malformed ones.
    pub fn list_from_json(records: &[Value]) -> Vec<Self> {
        records.iter().filter_map(Self::from_json).collect()
    }

    pub fn has_children(&self) -> bool {
        !self.requirements.is_empty()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + count_all(&self.requirements)
    }

    /// Row body for the requirement table. The parent column is left out for
    /// root requirements so the backend stores NULL.
    pub fn to_row(&self, badge_id: &RecordId, parent_id: Option<&RecordId>) -> Value {
        let mut row = Map::new();
        row.insert(BADGE_ID.to_string(), json!(badge_id));
        row.insert(REQUIREMENT_IDENTIFIER.to_string(), json!(self.identifier));
        row.insert(REQUIREMENT_DESCRIPTION.to_string(), json!(self.description));
        if let Some(parent_id) = parent_id {
            row.insert(REQUIREMENT_PARENT_ID.to_string(), json!(parent_id));
        }
        Value::Object(row)
    }
}

/// Total number of nodes across a list of requirement trees.
pub fn count_all(requirements: &[Requirement]) -> usize {
    requirements.iter().map(Requirement::count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_without_children_key() {
        let req = Requirement::from_json(&json!({"rqmt_idnf": "1", "rqmt_desc": "Do the thing"}))
            .unwrap();
        assert_eq!(req.identifier, "1");
        assert_eq!(req.description, "Do the thing");
        assert!(req.requirements.is_empty());
        assert!(!req.has_children());
        assert_eq!(req.id, None);
        assert_eq!(req.parent_id, None);
        assert_eq!(req.badge_id, None);
    }

    #[test]
    fn test_requirement_null_children_is_empty() {
        let req = Requirement::from_json(
            &json!({"rqmt_idnf": "2", "rqmt_desc": "x", "requirements": null}),
        )
        .unwrap();
        assert!(req.requirements.is_empty());
    }

    #[test]
    fn test_requirement_requires_identifier_and_description() {
        assert!(Requirement::from_json(&json!({"rqmt_desc": "x"})).is_none());
        assert!(Requirement::from_json(&json!({"rqmt_idnf": "1"})).is_none());
        assert!(Requirement::from_json(
            &json!({"rqmt_idnf": "1", "rqmt_desc": "x", "requirements": "a"})
        )
        .is_none());
    }

    #[test]
    fn test_requirement_nested_parse_skips_malformed_children() {
        let record = json!({
            "rqmt_idnf": "4",
            "rqmt_desc": "Do one of the following",
            "requirements": [
                {"rqmt_idnf": "a", "rqmt_desc": "Option a"},
                {"rqmt_desc": "no label"},
                {"rqmt_idnf": "c", "rqmt_desc": "Option c", "requirements": [
                    {"rqmt_idnf": "1", "rqmt_desc": "Deep"}
                ]}
            ]
        });
        let req = Requirement::from_json(&record).unwrap();
        let labels: Vec<_> = req.requirements.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(labels, vec!["a", "c"]);
        assert_eq!(req.requirements[1].requirements[0].description, "Deep");
        assert_eq!(req.count(), 4);
    }

    #[test]
    fn test_requirement_row_omits_parent_for_roots() {
        let req = Requirement::new("1", "Explain", vec![]);
        let badge = RecordId::Int(9);

        assert_eq!(
            req.to_row(&badge, None),
            json!({"badge_id": 9, "rqmt_idnf": "1", "rqmt_desc": "Explain"})
        );
        assert_eq!(
            req.to_row(&badge, Some(&RecordId::Int(3))),
            json!({"badge_id": 9, "rqmt_idnf": "1", "rqmt_desc": "Explain", "parent_rqmt_id": 3})
        );
    }
}
