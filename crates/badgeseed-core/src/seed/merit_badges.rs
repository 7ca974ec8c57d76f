use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::models::{count_all, MeritBadge, RecordId, Requirement};
use crate::schema::{
    BADGE_ID, BADGE_TABLE, DEPARTMENT_ID, DEPARTMENT_NAME, DEPARTMENT_TABLE, REQUIREMENT_ID,
    REQUIREMENT_TABLE,
};
use crate::source::BadgesByDepartment;

use super::{FailurePolicy, SeedError, SeedReport};

/// Insert every badge, department by department, followed by its
/// requirement tree.
///
/// The departments must already exist remotely. Generated ids are written
/// back onto the badges and requirements as they are inserted.
pub async fn seed_merit_badges(
    backend: &dyn Backend,
    badges: &mut BadgesByDepartment,
    policy: FailurePolicy,
) -> SeedReport {
    let mut seeder = MeritBadgeSeeder {
        backend,
        policy,
        report: SeedReport::start(),
    };

    for (department, list) in badges.iter_mut() {
        seeder.seed_department(department, list).await;
    }

    seeder.report.finish();
    seeder.report
}

struct MeritBadgeSeeder<'a> {
    backend: &'a dyn Backend,
    policy: FailurePolicy,
    report: SeedReport,
}

impl<'a> MeritBadgeSeeder<'a> {
    async fn seed_department(&mut self, department: &str, badges: &mut [MeritBadge]) {
        let department_id = match self.resolve_department(department).await {
            Ok(id) => id,
            Err(err) => {
                self.report.record_failure(format!("department {}", department), &err);
                self.report.skipped_badges += badges.len();
                return;
            }
        };
        info!(department = department, id = %department_id, badges = badges.len(), "Seeding department");

        for badge in badges.iter_mut() {
            self.seed_badge(&department_id, badge).await;
        }
    }

    async fn resolve_department(&self, name: &str) -> Result<RecordId, SeedError> {
        let row = self
            .backend
            .select_one_ilike(DEPARTMENT_TABLE, DEPARTMENT_ID, DEPARTMENT_NAME, name)
            .await?
            .ok_or_else(|| SeedError::DepartmentNotFound(name.to_string()))?;

        RecordId::from_row(&row, DEPARTMENT_ID).ok_or(SeedError::MissingColumn {
            table: DEPARTMENT_TABLE,
            column: DEPARTMENT_ID,
        })
    }

    async fn seed_badge(&mut self, department_id: &RecordId, badge: &mut MeritBadge) {
        let row = badge.to_row(department_id);
        match self.insert(BADGE_TABLE, BADGE_ID, &row).await {
            Ok(Some(badge_id)) => {
                self.report.badges += 1;
                badge.id = Some(badge_id.clone());
                info!(badge = %badge.name, id = %badge_id, requirements = badge.requirement_count(), "Inserted badge");
                self.insert_tree(&badge_id, &mut badge.requirements, None).await;
            }
            Ok(None) => {
                self.report.badges += 1;
                self.report.skipped_requirements += badge.requirement_count();
                warn!(badge = %badge.name, "Insert returned no row, skipping its requirements");
            }
            Err(err) => {
                self.report.record_failure(format!("badge {}", badge.name), &err);
                self.report.skipped_requirements += badge.requirement_count();
            }
        }
    }

    /// Insert `requirements` in order under `parent_id`, then each node's
    /// children under that node's new id.
    fn insert_tree<'s>(
        &'s mut self,
        badge_id: &'s RecordId,
        requirements: &'s mut [Requirement],
        parent_id: Option<&'s RecordId>,
    ) -> BoxFuture<'s, ()> {
        async move {
            for requirement in requirements.iter_mut() {
                let row = requirement.to_row(badge_id, parent_id);
                let inserted = match self.insert(REQUIREMENT_TABLE, REQUIREMENT_ID, &row).await {
                    Ok(id) => {
                        self.report.requirements += 1;
                        id
                    }
                    Err(err) => {
                        let subject = format!("requirement {} of badge {}", requirement.identifier, badge_id);
                        self.report.record_failure(subject, &err);
                        None
                    }
                };

                if let Some(id) = &inserted {
                    requirement.id = Some(id.clone());
                    requirement.badge_id = Some(badge_id.clone());
                    requirement.parent_id = parent_id.cloned();
                    debug!(requirement = %requirement.identifier, id = %id, "Inserted requirement");
                }

                if !requirement.has_children() {
                    continue;
                }
                match (inserted.as_ref(), self.policy) {
                    (Some(id), _) => {
                        self.insert_tree(badge_id, &mut requirement.requirements, Some(id))
                            .await;
                    }
                    (None, FailurePolicy::SkipNode) => {
                        self.insert_tree(badge_id, &mut requirement.requirements, parent_id)
                            .await;
                    }
                    (None, FailurePolicy::SkipSubtree) => {
                        let skipped = count_all(&requirement.requirements);
                        self.report.skipped_requirements += skipped;
                        warn!(requirement = %requirement.identifier, skipped = skipped, "Skipping nested requirements");
                    }
                }
            }
        }
        .boxed()
    }

    /// Insert a row and read its generated id. `Ok(None)` means the backend
    /// stored the row but returned nothing.
    async fn insert(
        &self,
        table: &'static str,
        id_column: &'static str,
        row: &Value,
    ) -> Result<Option<RecordId>, SeedError> {
        let rows = self.backend.insert(table, row).await?;
        match rows.first() {
            None => Ok(None),
            Some(returned) => RecordId::from_row(returned, id_column)
                .map(Some)
                .ok_or(SeedError::MissingColumn {
                    table,
                    column: id_column,
                }),
        }
    }
}
