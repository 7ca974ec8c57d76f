//! Seeding procedures.
//!
//! - `seed_departments`: insert every department record
//! - `seed_merit_badges`: insert badges per department, then each badge's
//!   requirement tree parent-first
//!
//! Both run strictly one call at a time and never stop on a failed record:
//! the failure is logged, added to the `SeedReport`, and the next record is
//! processed.

pub mod departments;
pub mod merit_badges;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;

use crate::api::ApiError;

pub use departments::seed_departments;
pub use merit_badges::seed_merit_badges;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("department '{0}' not found")]
    DepartmentNotFound(String),

    #[error("{table} row returned without a usable '{column}'")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

impl SeedError {
    pub fn category(&self) -> FailureCategory {
        match self {
            SeedError::Api(err) if err.is_backend_reported() => FailureCategory::Api,
            _ => FailureCategory::General,
        }
    }
}

/// How a failed record is tagged on the error stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// The backend answered with an error.
    Api,
    /// Anything else: transport faults, bad rows, bad input, lookup misses.
    General,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCategory::Api => f.write_str("API ERROR"),
            FailureCategory::General => f.write_str("GENERAL ERROR"),
        }
    }
}

/// What happens to the descendants of a requirement whose insert failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Descendants are not inserted.
    #[default]
    SkipSubtree,
    /// Descendants are inserted under the nearest persisted ancestor, or as
    /// roots when there is none.
    SkipNode,
}

#[derive(Debug, Clone)]
pub struct Failure {
    pub category: FailureCategory,
    /// The record that failed, e.g. `badge Camping`.
    pub subject: String,
    pub message: String,
}

impl Failure {
    /// The line written to the error stream for this failure.
    pub fn log_line(&self) -> String {
        format!("{} DETECTED: {}: {}", self.category, self.subject, self.message)
    }
}

/// Outcome of one seeding run.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub departments: usize,
    pub badges: usize,
    pub requirements: usize,
    /// Badges never attempted because their department could not be resolved.
    pub skipped_badges: usize,
    /// Requirements never attempted because an ancestor failed.
    pub skipped_requirements: usize,
    pub failures: Vec<Failure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SeedReport {
    pub fn start() -> Self {
        Self {
            departments: 0,
            badges: 0,
            requirements: 0,
            skipped_badges: 0,
            skipped_requirements: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Log a failure on the error stream and keep it for the summary.
    pub fn record_failure(&mut self, subject: impl Into<String>, err: &SeedError) {
        let failure = Failure {
            category: err.category(),
            subject: subject.into(),
            message: err.to_string(),
        };
        error!("{}", failure.log_line());
        self.failures.push(failure);
    }

    pub fn failure_count(&self, category: FailureCategory) -> usize {
        self.failures.iter().filter(|f| f.category == category).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped_badges == 0 && self.skipped_requirements == 0
    }

    pub fn elapsed_display(&self) -> String {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        let millis = (end - self.started_at).num_milliseconds().max(0);
        if millis < 1000 {
            format!("{}ms", millis)
        } else {
            format!("{:.1}s", millis as f64 / 1000.0)
        }
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.departments > 0 {
            parts.push(format!("{} departments", self.departments));
        }
        if self.badges > 0 || self.requirements > 0 {
            parts.push(format!("{} badges", self.badges));
            parts.push(format!("{} requirements", self.requirements));
        }
        if parts.is_empty() {
            parts.push("nothing".to_string());
        }

        let mut line = format!("Inserted {}", parts.join(", "));
        if !self.failures.is_empty() {
            line.push_str(&format!(
                "; {} failed ({} api, {} general)",
                self.failures.len(),
                self.failure_count(FailureCategory::Api),
                self.failure_count(FailureCategory::General)
            ));
        }
        if self.skipped_badges > 0 {
            line.push_str(&format!("; {} badges skipped", self.skipped_badges));
        }
        if self.skipped_requirements > 0 {
            line.push_str(&format!("; {} requirements skipped", self.skipped_requirements));
        }
        line.push_str(&format!(" in {}", self.elapsed_display()));
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_failure_category_display() {
        assert_eq!(FailureCategory::Api.to_string(), "API ERROR");
        assert_eq!(FailureCategory::General.to_string(), "GENERAL ERROR");
    }

    #[test]
    fn test_seed_error_category() {
        let backend = SeedError::Api(ApiError::Backend {
            status: 409,
            code: None,
            message: "duplicate".into(),
        });
        assert_eq!(backend.category(), FailureCategory::Api);
        assert_eq!(
            SeedError::Api(ApiError::Decode("eof".into())).category(),
            FailureCategory::General
        );
        assert_eq!(
            SeedError::DepartmentNotFound("Nature".into()).category(),
            FailureCategory::General
        );
    }

    #[test]
    fn test_report_summary() {
        let mut report = SeedReport::start();
        report.badges = 2;
        report.requirements = 14;
        report.record_failure("badge Camping", &SeedError::MalformedRecord("x".into()));
        report.skipped_requirements = 3;
        report.started_at = Utc::now() - Duration::milliseconds(2500);
        report.finish();

        let summary = report.summary();
        assert!(summary.starts_with("Inserted 2 badges, 14 requirements; 1 failed (0 api, 1 general)"));
        assert!(summary.contains("3 requirements skipped"));
        assert!(summary.ends_with("s"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_empty_report() {
        let mut report = SeedReport::start();
        report.finish();
        assert!(report.is_clean());
        assert!(report.summary().starts_with("Inserted nothing in "));
    }
}
