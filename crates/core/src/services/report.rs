//! Report lifecycle and review-lock management.
//!
//! Reports move PENDING -> UNDER_REVIEW -> RESOLVED/DISMISSED. Claiming a
//! report takes a time-boxed advisory lock; all transitions go through
//! conditional updates in the repository, and a zero-row result is classified
//! here into the precise client error by re-reading the row.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rentmate_common::{AppError, AppResult, IdGenerator};
use rentmate_db::{
    entities::{
        report::{self, ReportStatus, ReportType},
        user::{self, ActivityStatus},
    },
    repositories::{ReportQuery, ReportRepository, UserRepository},
};
use sea_orm::{ActiveEnum, Set};

use super::event_publisher::ReportEventPublisher;
use super::rental::RentalClient;

/// Minimum detail length for FAKE_USER and OVERDUE reports.
const MIN_DETAILS_SHORT: usize = 20;
/// Minimum detail length for FRAUD and DAMAGE reports.
const MIN_DETAILS_LONG: usize = 60;

/// Input for creating a report against a rental.
pub struct CreateReportInput {
    pub report_type: ReportType,
    pub details: String,
    pub damage_percentage: Option<f64>,
    pub rental_id: String,
    pub delivery_id: Option<String>,
}

/// Terminal decision applied to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved,
    Dismissed,
}

/// One page of reports, with the users they mention batch-loaded for display.
pub struct ReportPage {
    pub reports: Vec<report::Model>,
    pub total: u64,
    pub users: HashMap<String, user::Model>,
}

/// Report service: creation, listings, and the claim/lock protocol.
#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    user_repo: UserRepository,
    rental_client: Arc<dyn RentalClient>,
    events: Arc<dyn ReportEventPublisher>,
    lock_ttl: Duration,
    id_gen: IdGenerator,
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        report_repo: ReportRepository,
        user_repo: UserRepository,
        rental_client: Arc<dyn RentalClient>,
        events: Arc<dyn ReportEventPublisher>,
        lock_ttl: Duration,
    ) -> Self {
        Self {
            report_repo,
            user_repo,
            rental_client,
            events,
            lock_ttl,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Creation ==========

    /// Create a new report anchored to a rental transaction.
    ///
    /// The reporter and reported party are derived from the rental (owner
    /// reports renter); client-supplied user IDs are not trusted.
    pub async fn create_report(&self, input: CreateReportInput) -> AppResult<report::Model> {
        let details = input.details.trim();
        Self::validate_details(input.report_type, details)?;

        if let Some(pct) = input.damage_percentage {
            if !(0.0..=100.0).contains(&pct) {
                return Err(AppError::Validation(
                    "Damage percentage must be between 0 and 100".to_string(),
                ));
            }
        }

        let rental = self
            .rental_client
            .get_rental(&input.rental_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Rental {} not found", input.rental_id))
            })?;

        let now = Utc::now();
        if input.report_type == ReportType::Overdue && !rental.is_ended(now) {
            return Err(AppError::BadRequest("Rental is not overdue".to_string()));
        }

        // Make sure the reported party exists locally before inserting.
        self.user_repo.get_by_id(&rental.renter_id).await?;

        let id = self.id_gen.generate();
        let model = report::ActiveModel {
            id: Set(id),
            reporter_id: Set(rental.owner_id.clone()),
            reported_user_id: Set(rental.renter_id.clone()),
            report_type: Set(input.report_type),
            details: Set(details.to_string()),
            damage_percentage: Set(input.damage_percentage),
            related_rental_id: Set(Some(rental.id)),
            related_delivery_id: Set(input.delivery_id),
            status: Set(ReportStatus::Pending),
            claimed_by: Set(None),
            claimed_at: Set(None),
            lock_expires_at: Set(None),
            resolved_by: Set(None),
            resolved_at: Set(None),
            resolution_notes: Set(None),
            escalated_from_id: Set(None),
            submitted_at: Set(now.into()),
            updated_at: Set(None),
        };

        let created = self.report_repo.create(model).await?;

        // Flag the reported user, unless a stronger status already applies.
        self.user_repo
            .set_activity_status_if(
                &rental.renter_id,
                ActivityStatus::Active,
                ActivityStatus::PendingReportReview,
                now,
            )
            .await?;

        if let Err(e) = self
            .events
            .report_created(
                &created.id,
                &created.reported_user_id,
                &created.report_type.to_value(),
            )
            .await
        {
            tracing::warn!(report_id = %created.id, error = %e, "Failed to publish report created event");
        }

        Ok(created)
    }

    fn validate_details(report_type: ReportType, details: &str) -> AppResult<()> {
        let min = match report_type {
            ReportType::Thieving => {
                return Err(AppError::BadRequest(
                    "THIEVING reports cannot be created directly".to_string(),
                ));
            }
            ReportType::FakeUser | ReportType::Overdue => MIN_DETAILS_SHORT,
            ReportType::Fraud | ReportType::Damage => MIN_DETAILS_LONG,
        };

        if details.chars().count() < min {
            return Err(AppError::Validation(format!(
                "Details must be at least {min} characters for this report type"
            )));
        }

        Ok(())
    }

    // ========== Reads ==========

    /// Get a report by ID.
    pub async fn get_report(&self, id: &str) -> AppResult<report::Model> {
        self.report_repo.get(id).await
    }

    /// Get a report together with the profiles of the users it mentions.
    pub async fn get_report_with_users(
        &self,
        id: &str,
    ) -> AppResult<(report::Model, HashMap<String, user::Model>)> {
        let report = self.report_repo.get(id).await?;
        let users = self.load_users(std::slice::from_ref(&report)).await?;
        Ok((report, users))
    }

    /// Reports submitted by a user, newest first.
    pub async fn submitted_by(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let filter = ReportQuery {
            reporter_id: Some(user_id.to_string()),
            ..Default::default()
        };
        self.page(filter, limit, offset).await
    }

    /// Reports filed against a user, newest first.
    pub async fn received_by(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let filter = ReportQuery {
            reported_user_id: Some(user_id.to_string()),
            ..Default::default()
        };
        self.page(filter, limit, offset).await
    }

    /// All reports matching an optional status/type filter.
    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        report_type: Option<ReportType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let filter = ReportQuery {
            status,
            report_type,
            ..Default::default()
        };
        self.page(filter, limit, offset).await
    }

    /// Unclaimed work: PENDING reports, optionally narrowed by type.
    pub async fn available(
        &self,
        report_type: Option<ReportType>,
        limit: u64,
        offset: u64,
    ) -> AppResult<ReportPage> {
        let filter = ReportQuery {
            status: Some(ReportStatus::Pending),
            report_type,
            ..Default::default()
        };
        self.page(filter, limit, offset).await
    }

    async fn page(&self, filter: ReportQuery, limit: u64, offset: u64) -> AppResult<ReportPage> {
        let reports = self.report_repo.list(&filter, limit, offset).await?;
        let total = self.report_repo.count(&filter).await?;
        let users = self.load_users(&reports).await?;

        Ok(ReportPage {
            reports,
            total,
            users,
        })
    }

    async fn load_users(
        &self,
        reports: &[report::Model],
    ) -> AppResult<HashMap<String, user::Model>> {
        let mut ids: Vec<String> = reports
            .iter()
            .flat_map(|r| [r.reporter_id.clone(), r.reported_user_id.clone()])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let users = self.user_repo.get_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id.clone(), u)).collect())
    }

    // ========== Lock protocol ==========

    /// Claim a report for review. Returns the lock expiry.
    ///
    /// Claiming an unclaimed report, re-claiming one's own report, and
    /// taking over an expired lock all succeed; a live lock held by someone
    /// else is a conflict.
    pub async fn claim(&self, id: &str, moderator_id: &str) -> AppResult<DateTime<Utc>> {
        let now = Utc::now();

        let report = self.report_repo.get(id).await?;
        if report.is_terminal() {
            return Err(AppError::TerminalState);
        }
        if report.is_locked(now) && !report.is_locked_by(moderator_id, now) {
            return Err(AppError::LockConflict {
                expires_at: report.lock_expires_at.map(Into::into),
            });
        }

        let expires_at = now + self.lock_ttl;
        let rows = self
            .report_repo
            .claim(id, moderator_id, expires_at, now)
            .await?;

        if rows == 0 {
            // Lost the race between the read and the update; report the
            // winner's lock.
            let report = self.report_repo.get(id).await?;
            if report.is_terminal() {
                return Err(AppError::TerminalState);
            }
            return Err(AppError::LockConflict {
                expires_at: report.lock_expires_at.map(Into::into),
            });
        }

        tracing::debug!(report_id = %id, moderator_id = %moderator_id, "Report claimed");
        Ok(expires_at)
    }

    /// Extend the caller's lock. Returns the new expiry.
    ///
    /// The holder may refresh even after expiry, as long as the reaper has
    /// not released the lock yet.
    pub async fn refresh_lock(&self, id: &str, moderator_id: &str) -> AppResult<DateTime<Utc>> {
        let now = Utc::now();
        let expires_at = now + self.lock_ttl;

        let rows = self
            .report_repo
            .refresh_lock(id, moderator_id, expires_at, now)
            .await?;

        if rows == 0 {
            // Distinguish a missing report from a lock held elsewhere.
            self.report_repo.get(id).await?;
            return Err(AppError::Forbidden(
                "You do not hold the lock on this report".to_string(),
            ));
        }

        Ok(expires_at)
    }

    /// Give up the caller's lock and return the report to PENDING.
    pub async fn release(&self, id: &str, moderator_id: &str) -> AppResult<()> {
        let now = Utc::now();

        let rows = self.report_repo.release_lock(id, moderator_id, now).await?;

        if rows == 0 {
            self.report_repo.get(id).await?;
            return Err(AppError::Forbidden(
                "You do not hold the lock on this report".to_string(),
            ));
        }

        tracing::debug!(report_id = %id, moderator_id = %moderator_id, "Report lock released");
        Ok(())
    }

    /// Apply a terminal decision to a report.
    ///
    /// Resolving without a prior claim acts as a final implicit claim; a
    /// live lock held by someone else blocks the decision. On dismissal the
    /// reported user's review flag is lifted if nothing else changed it.
    pub async fn resolve(
        &self,
        id: &str,
        moderator_id: &str,
        outcome: ResolveOutcome,
        notes: Option<String>,
    ) -> AppResult<()> {
        let now = Utc::now();

        let report = self.report_repo.get(id).await?;
        if report.is_terminal() {
            return Err(AppError::TerminalState);
        }
        if report.is_locked(now) && !report.is_locked_by(moderator_id, now) {
            return Err(AppError::LockConflict {
                expires_at: report.lock_expires_at.map(Into::into),
            });
        }

        let status = match outcome {
            ResolveOutcome::Resolved => ReportStatus::Resolved,
            ResolveOutcome::Dismissed => ReportStatus::Dismissed,
        };

        let rows = self
            .report_repo
            .resolve(id, moderator_id, status, notes.as_deref(), now)
            .await?;

        if rows == 0 {
            let report = self.report_repo.get(id).await?;
            if report.is_terminal() {
                return Err(AppError::TerminalState);
            }
            return Err(AppError::LockConflict {
                expires_at: report.lock_expires_at.map(Into::into),
            });
        }

        if outcome == ResolveOutcome::Dismissed {
            // Lift the review flag only if it is still the report flag;
            // a suspension applied meanwhile must not be undone.
            self.user_repo
                .set_activity_status_if(
                    &report.reported_user_id,
                    ActivityStatus::PendingReportReview,
                    ActivityStatus::Active,
                    now,
                )
                .await?;
        }

        let publish = match outcome {
            ResolveOutcome::Resolved => {
                self.events
                    .report_resolved(id, &report.reported_user_id)
                    .await
            }
            ResolveOutcome::Dismissed => {
                self.events
                    .report_dismissed(id, &report.reported_user_id)
                    .await
            }
        };
        if let Err(e) = publish {
            tracing::warn!(report_id = %id, error = %e, "Failed to publish report decision event");
        }

        tracing::info!(report_id = %id, moderator_id = %moderator_id, ?outcome, "Report closed");
        Ok(())
    }

    // ========== Lock reaper ==========

    /// Force-release all expired locks. Returns how many were released.
    ///
    /// Each release is guarded so a lock refreshed between the scan and the
    /// update is left alone. One item's failure never aborts the sweep.
    pub async fn release_expired_locks(&self) -> AppResult<u64> {
        let now = Utc::now();
        let expired = self.report_repo.find_expired_locks(now).await?;

        let mut released = 0u64;
        for report in expired {
            let Some(holder) = report.claimed_by.as_deref() else {
                continue;
            };

            match self.report_repo.release_expired(&report.id, holder, now).await {
                Ok(rows) if rows > 0 => {
                    released += rows;
                    tracing::info!(report_id = %report.id, holder = %holder, "Released expired report lock");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(report_id = %report.id, error = %e, "Failed to release expired lock");
                }
            }
        }

        Ok(released)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{NoOpEventPublisher, Rental};
    use async_trait::async_trait;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};

    struct FixedRentalClient(Option<Rental>);

    #[async_trait]
    impl RentalClient for FixedRentalClient {
        async fn get_rental(&self, _id: &str) -> AppResult<Option<Rental>> {
            Ok(self.0.clone())
        }
    }

    fn ended_rental() -> Rental {
        let now = Utc::now();
        Rental {
            id: "rental1".to_string(),
            owner_id: "owner1".to_string(),
            renter_id: "renter1".to_string(),
            start_date: now - Duration::days(10),
            end_date: now - Duration::days(2),
        }
    }

    fn active_rental() -> Rental {
        let now = Utc::now();
        Rental {
            id: "rental1".to_string(),
            owner_id: "owner1".to_string(),
            renter_id: "renter1".to_string(),
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(6),
        }
    }

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            first_name: "Rin".to_string(),
            last_name: "Okabe".to_string(),
            email: format!("{id}@example.com"),
            token: None,
            is_moderator: false,
            is_delivery_agent: false,
            activity_status: ActivityStatus::Active,
            is_disabled: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_report(id: &str, status: ReportStatus) -> report::Model {
        report::Model {
            id: id.to_string(),
            reporter_id: "owner1".to_string(),
            reported_user_id: "renter1".to_string(),
            report_type: ReportType::Overdue,
            details: "Item was not returned after the rental period".to_string(),
            damage_percentage: None,
            related_rental_id: Some("rental1".to_string()),
            related_delivery_id: None,
            status,
            claimed_by: None,
            claimed_at: None,
            lock_expires_at: None,
            resolved_by: None,
            resolved_at: None,
            resolution_notes: None,
            escalated_from_id: None,
            submitted_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn locked_report(id: &str, holder: &str, expires_in_secs: i64) -> report::Model {
        let now = Utc::now();
        let mut r = test_report(id, ReportStatus::UnderReview);
        r.claimed_by = Some(holder.to_string());
        r.claimed_at = Some(now.into());
        r.lock_expires_at = Some((now + Duration::seconds(expires_in_secs)).into());
        r
    }

    fn service(db: DatabaseConnection, rental: Option<Rental>) -> ReportService {
        let db = Arc::new(db);
        ReportService::new(
            ReportRepository::new(db.clone()),
            UserRepository::new(db),
            Arc::new(FixedRentalClient(rental)),
            Arc::new(NoOpEventPublisher),
            Duration::minutes(30),
        )
    }

    #[tokio::test]
    async fn test_create_report_rejects_short_details() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db, Some(ended_rental()));

        let result = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Fraud,
                details: "Too short".to_string(),
                damage_percentage: None,
                rental_id: "rental1".to_string(),
                delivery_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_report_rejects_direct_thieving() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db, Some(ended_rental()));

        let result = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Thieving,
                details: "The renter stole the item and never returned it at all".to_string(),
                damage_percentage: None,
                rental_id: "rental1".to_string(),
                delivery_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_report_rejects_out_of_range_damage() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db, Some(ended_rental()));

        let result = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Damage,
                details: "The drill came back with a cracked housing and a bent chuck, \
                          and the battery no longer holds any charge"
                    .to_string(),
                damage_percentage: Some(140.0),
                rental_id: "rental1".to_string(),
                delivery_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_report_missing_rental() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db, None);

        let result = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Overdue,
                details: "Item was not returned after the rental period".to_string(),
                damage_percentage: None,
                rental_id: "ghost".to_string(),
                delivery_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_overdue_requires_ended_rental() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db, Some(active_rental()));

        let result = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Overdue,
                details: "Item was not returned after the rental period".to_string(),
                damage_percentage: None,
                rental_id: "rental1".to_string(),
                delivery_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_report_derives_parties_from_rental() {
        let created = test_report("report1", ReportStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("renter1")]])
            .append_query_results([[created]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let svc = service(db, Some(ended_rental()));

        let report = svc
            .create_report(CreateReportInput {
                report_type: ReportType::Overdue,
                details: "Item was not returned after the rental period".to_string(),
                damage_percentage: None,
                rental_id: "rental1".to_string(),
                delivery_id: None,
            })
            .await
            .unwrap();

        assert_eq!(report.reporter_id, "owner1");
        assert_eq!(report.reported_user_id, "renter1");
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[tokio::test]
    async fn test_claim_unclaimed_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_report("report1", ReportStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db, None);

        let expires_at = svc.claim("report1", "mod1").await.unwrap();
        assert!(expires_at > Utc::now());
    }

    #[tokio::test]
    async fn test_claim_conflict_with_live_lock() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked_report("report1", "mod1", 600)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc.claim("report1", "mod2").await;

        assert!(matches!(
            result,
            Err(AppError::LockConflict {
                expires_at: Some(_)
            })
        ));
    }

    #[tokio::test]
    async fn test_claim_terminal_report() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_report("report1", ReportStatus::Resolved)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc.claim("report1", "mod1").await;

        assert!(matches!(result, Err(AppError::TerminalState)));
    }

    #[tokio::test]
    async fn test_claim_takes_over_expired_lock() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked_report("report1", "mod1", -600)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db, None);

        let result = svc.claim("report1", "mod2").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_claim_lost_race_reports_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_report("report1", ReportStatus::Pending)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[locked_report("report1", "mod1", 1800)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc.claim("report1", "mod2").await;

        assert!(matches!(result, Err(AppError::LockConflict { .. })));
    }

    #[tokio::test]
    async fn test_refresh_lock_not_holder() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[locked_report("report1", "mod1", 600)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc.refresh_lock("report1", "mod2").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_release_by_holder() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db, None);

        assert!(svc.release("report1", "mod1").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_already_terminal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_report("report1", ReportStatus::Dismissed)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc
            .resolve("report1", "mod1", ResolveOutcome::Resolved, None)
            .await;

        assert!(matches!(result, Err(AppError::TerminalState)));
    }

    #[tokio::test]
    async fn test_resolve_blocked_by_other_lock() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked_report("report1", "mod1", 600)]])
            .into_connection();
        let svc = service(db, None);

        let result = svc
            .resolve("report1", "mod2", ResolveOutcome::Dismissed, None)
            .await;

        assert!(matches!(result, Err(AppError::LockConflict { .. })));
    }

    #[tokio::test]
    async fn test_dismiss_restores_reported_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked_report("report1", "mod1", 600)]])
            .append_exec_results([
                // resolve CAS
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // conditional status restoration
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();
        let svc = service(db, None);

        let result = svc
            .resolve(
                "report1",
                "mod1",
                ResolveOutcome::Dismissed,
                Some("No evidence of wrongdoing".to_string()),
            )
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reaper_releases_lock_just_past_expiry() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[locked_report("report1", "mod1", -60)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db, None);

        let released = svc.release_expired_locks().await.unwrap();
        assert_eq!(released, 1);
    }

    #[tokio::test]
    async fn test_release_expired_locks_skips_refreshed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                locked_report("report1", "mod1", -600),
                locked_report("report2", "mod2", -600),
            ]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                // second lock was refreshed between scan and update
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let svc = service(db, None);

        let released = svc.release_expired_locks().await.unwrap();
        assert_eq!(released, 1);
    }
}
