//! In-memory table store.
//!
//! Backs `--dry-run` and the seeder tests. Rows get per-table sequential
//! integer ids, lookups compare case-insensitively, and inserts can be made
//! to fail or to come back empty.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::schema::id_column;

use super::{ApiError, Backend};

/// Error code reported for injected rejections.
const REJECTION_CODE: &str = "P0001";

#[derive(Debug, Clone)]
struct Rejection {
    table: String,
    column: String,
    value: Value,
    message: String,
}

impl Rejection {
    fn matches(&self, table: &str, row: &Value) -> bool {
        self.table == table && row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<String, Vec<Value>>,
    next_ids: BTreeMap<String, i64>,
    attempts: Vec<(String, Value)>,
    rejections: Vec<Rejection>,
    hidden: BTreeSet<String>,
}

impl State {
    fn store(&mut self, table: &str, row: &Value) -> Value {
        let next = self.next_ids.entry(table.to_string()).or_insert(1);
        let id = *next;
        *next += 1;

        let mut stored = match row {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        stored.insert(id_column(table).to_string(), Value::from(id));
        let stored = Value::Object(stored);

        self.tables
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        stored
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a row directly, bypassing rejections and the attempt log.
    /// Returns the stored row including its generated id.
    pub fn preload(&self, table: &str, row: Value) -> Value {
        self.state().store(table, &row)
    }

    /// Make inserts into `table` whose `column` equals `value` fail with a
    /// backend-reported error carrying `message`.
    pub fn reject_where(&self, table: &str, column: &str, value: Value, message: &str) {
        self.state().rejections.push(Rejection {
            table: table.to_string(),
            column: column.to_string(),
            value,
            message: message.to_string(),
        });
    }

    /// Store inserts into `table` but return no rows, the way a row-level
    /// policy that forbids reading them back would.
    pub fn hide_returned_rows(&self, table: &str) {
        self.state().hidden.insert(table.to_string());
    }

    /// Rows stored in `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every insert call made, rejected ones included, as `(table, row)`.
    pub fn attempts(&self) -> Vec<(String, Value)> {
        self.state().attempts.clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, ApiError> {
        let mut state = self.state();
        state.attempts.push((table.to_string(), row.clone()));

        if let Some(rejection) = state.rejections.iter().find(|r| r.matches(table, row)) {
            return Err(ApiError::Backend {
                status: 400,
                code: Some(REJECTION_CODE.to_string()),
                message: rejection.message.clone(),
            });
        }

        let stored = state.store(table, row);
        if state.hidden.contains(table) {
            Ok(Vec::new())
        } else {
            Ok(vec![stored])
        }
    }

    async fn select_one_ilike(
        &self,
        table: &str,
        select: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, ApiError> {
        let state = self.state();
        let wanted = value.to_lowercase();
        let matches: Vec<&Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.get(column)
                            .and_then(Value::as_str)
                            .is_some_and(|v| v.to_lowercase() == wanted)
                    })
                    .collect()
            })
            .unwrap_or_default();

        match matches.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(project(row, select))),
            _ => Err(ApiError::InvalidResponse(format!(
                "expected at most one {} row where {} matches '{}', got {}",
                table,
                column,
                value,
                matches.len()
            ))),
        }
    }
}

/// Keep only the comma-separated `select` columns of `row`.
fn project(row: &Value, select: &str) -> Value {
    if select.trim() == "*" {
        return row.clone();
    }
    let projected: Map<String, Value> = select
        .split(',')
        .map(str::trim)
        .filter_map(|col| row.get(col).map(|v| (col.to_string(), v.clone())))
        .collect();
    Value::Object(projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids_per_table() {
        let backend = MemoryBackend::new();
        let first = backend.insert("camp_dpmt", &json!({"dpmt_name": "A"})).await.unwrap();
        let second = backend.insert("camp_dpmt", &json!({"dpmt_name": "B"})).await.unwrap();
        let badge = backend.insert("merit_badge", &json!({"badge_name": "C"})).await.unwrap();

        assert_eq!(first[0]["dpmt_id"], json!(1));
        assert_eq!(second[0]["dpmt_id"], json!(2));
        assert_eq!(badge[0]["badge_id"], json!(1));
        assert_eq!(backend.rows("camp_dpmt").len(), 2);
        assert_eq!(backend.attempts().len(), 3);
    }

    #[tokio::test]
    async fn test_select_is_case_insensitive_and_projects() {
        let backend = MemoryBackend::new();
        backend.preload("camp_dpmt", json!({"dpmt_name": "Aquatics"}));

        let row = backend
            .select_one_ilike("camp_dpmt", "dpmt_id", "dpmt_name", "AQUATICS")
            .await
            .unwrap();
        assert_eq!(row, Some(json!({"dpmt_id": 1})));

        let missing = backend
            .select_one_ilike("camp_dpmt", "dpmt_id", "dpmt_name", "Shooting")
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_select_rejects_ambiguous_match() {
        let backend = MemoryBackend::new();
        backend.preload("camp_dpmt", json!({"dpmt_name": "Nature"}));
        backend.preload("camp_dpmt", json!({"dpmt_name": "NATURE"}));

        let err = backend
            .select_one_ilike("camp_dpmt", "dpmt_id", "dpmt_name", "nature")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_rejections_and_hidden_rows() {
        let backend = MemoryBackend::new();
        backend.reject_where("camp_dpmt", "dpmt_name", json!("Bad"), "nope");
        backend.hide_returned_rows("merit_badge");

        let err = backend.insert("camp_dpmt", &json!({"dpmt_name": "Bad"})).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
        assert!(err.is_backend_reported());
        assert!(backend.rows("camp_dpmt").is_empty());

        let rows = backend.insert("merit_badge", &json!({"badge_name": "X"})).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(backend.rows("merit_badge").len(), 1);
    }
}
