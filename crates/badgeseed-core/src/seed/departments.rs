use serde_json::Value;
use tracing::{debug, info};

use crate::api::Backend;
use crate::models::Department;
use crate::schema::{DEPARTMENT_NAME, DEPARTMENT_TABLE};
use crate::utils::truncate_string;

use super::{SeedError, SeedReport};

/// Longest record excerpt used to name a malformed department record
const SUBJECT_EXCERPT_LEN: usize = 60;

/// Insert one department row per record, in the order given.
///
/// Nothing is checked for existence first: seeding the same records twice
/// inserts every department twice unless the table itself refuses.
pub async fn seed_departments(backend: &dyn Backend, records: &[Value]) -> SeedReport {
    let mut report = SeedReport::start();
    info!(count = records.len(), "Seeding departments");

    for record in records {
        match insert_department(backend, record).await {
            Ok(rows) => {
                report.departments += 1;
                let returned = Value::Array(rows);
                debug!(rows = %returned, "Inserted department");
            }
            Err(err) => report.record_failure(subject(record), &err),
        }
    }

    report.finish();
    report
}

async fn insert_department(backend: &dyn Backend, record: &Value) -> Result<Vec<Value>, SeedError> {
    let department = Department::from_json(record).ok_or_else(|| {
        SeedError::MalformedRecord(format!("expected a non-empty '{}'", DEPARTMENT_NAME))
    })?;
    info!(department = %department.name, "Inserting department");
    Ok(backend.insert(DEPARTMENT_TABLE, &department.to_row()).await?)
}

fn subject(record: &Value) -> String {
    match record.get(DEPARTMENT_NAME).and_then(Value::as_str) {
        Some(name) => format!("department {}", name),
        None => format!(
            "department record {}",
            truncate_string(&record.to_string(), SUBJECT_EXCERPT_LEN)
        ),
    }
}
