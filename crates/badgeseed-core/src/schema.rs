//! Table and column names of the remote schema.
//!
//! The input JSON files use the same keys as the remote columns, so these
//! names double as the source record keys.

// ============================================================================
// Departments
// ============================================================================

pub const DEPARTMENT_TABLE: &str = "camp_dpmt";
pub const DEPARTMENT_ID: &str = "dpmt_id";
pub const DEPARTMENT_NAME: &str = "dpmt_name";

// ============================================================================
// Merit badges
// ============================================================================

pub const BADGE_TABLE: &str = "merit_badge";
pub const BADGE_ID: &str = "badge_id";
pub const BADGE_NAME: &str = "badge_name";
pub const BADGE_DESCRIPTION: &str = "badge_desc";
pub const BADGE_EAGLE_REQUIRED: &str = "eagle_badge";

// ============================================================================
// Requirements
// ============================================================================

pub const REQUIREMENT_TABLE: &str = "merit_badge_rqmt";
pub const REQUIREMENT_ID: &str = "rqmt_id";
pub const REQUIREMENT_IDENTIFIER: &str = "rqmt_idnf";
pub const REQUIREMENT_DESCRIPTION: &str = "rqmt_desc";
pub const REQUIREMENT_PARENT_ID: &str = "parent_rqmt_id";

/// Key holding nested requirements in badge and requirement records.
pub const REQUIREMENTS: &str = "requirements";

/// Primary key column of `table`. Unknown tables use `id`.
pub fn id_column(table: &str) -> &'static str {
    match table {
        DEPARTMENT_TABLE => DEPARTMENT_ID,
        BADGE_TABLE => BADGE_ID,
        REQUIREMENT_TABLE => REQUIREMENT_ID,
        _ => "id",
    }
}
