//! Report repository.
//!
//! Every state transition on a report is a single conditional `UPDATE` whose
//! `WHERE` clause carries the transition's precondition. Callers inspect the
//! returned `rows_affected` to tell a won transition from a lost race; the
//! database row is never read-modify-written.

use std::sync::Arc;

use crate::entities::{
    UserReport,
    report::{self, ReportStatus, ReportType},
};
use chrono::{DateTime, Utc};
use rentmate_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Filter for report listings.
#[derive(Debug, Clone, Default)]
pub struct ReportQuery {
    pub reporter_id: Option<String>,
    pub reported_user_id: Option<String>,
    pub status: Option<ReportStatus>,
    pub report_type: Option<ReportType>,
}

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a report by ID.
    pub async fn get(&self, id: &str) -> AppResult<report::Model> {
        UserReport::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Report {id} not found")))
    }

    /// List reports matching the filter, newest first.
    pub async fn list(
        &self,
        filter: &ReportQuery,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<report::Model>> {
        let mut query = UserReport::find().order_by_desc(report::Column::SubmittedAt);

        if let Some(reporter_id) = &filter.reporter_id {
            query = query.filter(report::Column::ReporterId.eq(reporter_id));
        }
        if let Some(reported_user_id) = &filter.reported_user_id {
            query = query.filter(report::Column::ReportedUserId.eq(reported_user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(report::Column::Status.eq(status));
        }
        if let Some(report_type) = filter.report_type {
            query = query.filter(report::Column::ReportType.eq(report_type));
        }

        query
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports matching the filter.
    pub async fn count(&self, filter: &ReportQuery) -> AppResult<u64> {
        let mut query = UserReport::find();

        if let Some(reporter_id) = &filter.reporter_id {
            query = query.filter(report::Column::ReporterId.eq(reporter_id));
        }
        if let Some(reported_user_id) = &filter.reported_user_id {
            query = query.filter(report::Column::ReportedUserId.eq(reported_user_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(report::Column::Status.eq(status));
        }
        if let Some(report_type) = filter.report_type {
            query = query.filter(report::Column::ReportType.eq(report_type));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports whose lock has expired but is still held.
    pub async fn find_expired_locks(&self, now: DateTime<Utc>) -> AppResult<Vec<report::Model>> {
        UserReport::find()
            .filter(report::Column::ClaimedBy.is_not_null())
            .filter(report::Column::LockExpiresAt.lt(now))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Reports of a given type and status submitted at or before the cutoff.
    pub async fn find_stale(
        &self,
        report_type: ReportType,
        status: ReportStatus,
        submitted_before: DateTime<Utc>,
    ) -> AppResult<Vec<report::Model>> {
        UserReport::find()
            .filter(report::Column::ReportType.eq(report_type))
            .filter(report::Column::Status.eq(status))
            .filter(report::Column::SubmittedAt.lte(submitted_before))
            .order_by_asc(report::Column::SubmittedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Acquire or refresh the review lock for a moderator.
    ///
    /// Succeeds only when the report is not terminal and is either unclaimed,
    /// already claimed by this moderator, or claimed under an expired lock.
    /// Returns the number of rows updated (0 = lost the race or precondition
    /// failed).
    pub async fn claim(
        &self,
        id: &str,
        moderator_id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(
                report::Column::Status
                    .is_not_in([ReportStatus::Resolved, ReportStatus::Dismissed]),
            )
            .filter(
                report::Column::ClaimedBy
                    .is_null()
                    .or(report::Column::ClaimedBy.eq(moderator_id))
                    .or(report::Column::LockExpiresAt.lt(now)),
            )
            .col_expr(report::Column::ClaimedBy, Expr::value(moderator_id))
            .col_expr(report::Column::ClaimedAt, Expr::value(now))
            .col_expr(report::Column::LockExpiresAt, Expr::value(expires_at))
            .col_expr(
                report::Column::Status,
                Expr::value(ReportStatus::UnderReview),
            )
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Extend the lock held by `moderator_id`.
    ///
    /// Deliberately does not check `lock_expires_at`: a holder whose lock
    /// expired but was not yet reaped may still refresh.
    pub async fn refresh_lock(
        &self,
        id: &str,
        moderator_id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::ClaimedBy.eq(moderator_id))
            .col_expr(report::Column::LockExpiresAt, Expr::value(expires_at))
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Release the lock held by `moderator_id` and return the report to
    /// PENDING.
    pub async fn release_lock(
        &self,
        id: &str,
        moderator_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::ClaimedBy.eq(moderator_id))
            .col_expr(report::Column::ClaimedBy, Expr::value(None::<String>))
            .col_expr(
                report::Column::ClaimedAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(
                report::Column::LockExpiresAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(report::Column::Status, Expr::value(ReportStatus::Pending))
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Write a terminal status for a moderator.
    ///
    /// Succeeds when the report is not yet terminal and no other moderator
    /// holds a live lock; resolving is a final implicit claim. Clears the
    /// lock fields in the same statement.
    pub async fn resolve(
        &self,
        id: &str,
        moderator_id: &str,
        status: ReportStatus,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(
                report::Column::Status
                    .is_not_in([ReportStatus::Resolved, ReportStatus::Dismissed]),
            )
            .filter(
                report::Column::ClaimedBy
                    .is_null()
                    .or(report::Column::ClaimedBy.eq(moderator_id))
                    .or(report::Column::LockExpiresAt.lt(now)),
            )
            .col_expr(report::Column::Status, Expr::value(status))
            .col_expr(report::Column::ResolvedBy, Expr::value(moderator_id))
            .col_expr(report::Column::ResolvedAt, Expr::value(now))
            .col_expr(
                report::Column::ResolutionNotes,
                Expr::value(notes.map(ToString::to_string)),
            )
            .col_expr(report::Column::ClaimedBy, Expr::value(None::<String>))
            .col_expr(
                report::Column::ClaimedAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(
                report::Column::LockExpiresAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Terminal transition performed by the system, not a moderator.
    ///
    /// Only touches reports still PENDING, which both bypasses moderator
    /// locks (a PENDING report has none that matter) and makes re-runs
    /// idempotent.
    pub async fn resolve_system(
        &self,
        id: &str,
        resolved_by: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::Status.eq(ReportStatus::Pending))
            .col_expr(report::Column::Status, Expr::value(ReportStatus::Resolved))
            .col_expr(report::Column::ResolvedBy, Expr::value(resolved_by))
            .col_expr(report::Column::ResolvedAt, Expr::value(now))
            .col_expr(report::Column::ResolutionNotes, Expr::value(notes))
            .col_expr(report::Column::ClaimedBy, Expr::value(None::<String>))
            .col_expr(
                report::Column::ClaimedAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(
                report::Column::LockExpiresAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Force-release one expired lock.
    ///
    /// Guarded by the observed holder and the expiry still being in the
    /// past, so a lock the holder refreshed between the scan and this update
    /// is left alone.
    pub async fn release_expired(
        &self,
        id: &str,
        holder_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = UserReport::update_many()
            .filter(report::Column::Id.eq(id))
            .filter(report::Column::ClaimedBy.eq(holder_id))
            .filter(report::Column::LockExpiresAt.lt(now))
            .col_expr(report::Column::ClaimedBy, Expr::value(None::<String>))
            .col_expr(
                report::Column::ClaimedAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(
                report::Column::LockExpiresAt,
                Expr::value(None::<DateTime<Utc>>),
            )
            .col_expr(report::Column::Status, Expr::value(ReportStatus::Pending))
            .col_expr(report::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
