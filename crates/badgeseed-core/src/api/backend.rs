use async_trait::async_trait;
use serde_json::Value;

use super::ApiError;

/// The remote table store the seeders write to.
///
/// Seeders take a `&dyn Backend` so the caller decides which store is used
/// and how long it lives.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Insert one row and return the rows the backend hands back. An empty
    /// list means the row was written but is not visible to this key.
    async fn insert(&self, table: &str, row: &Value) -> Result<Vec<Value>, ApiError>;

    /// Select `select` from the single row of `table` whose `column` matches
    /// `value` case-insensitively. More than one match is an error.
    async fn select_one_ilike(
        &self,
        table: &str,
        select: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<Value>, ApiError>;
}
