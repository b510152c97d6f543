//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, ActivityStatus},
};
use chrono::{DateTime, Utc};
use rentmate_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Batch-load users by ID, for resolving names in report listings.
    pub async fn get_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Look up a user by access token.
    pub async fn get_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set a user's activity status unconditionally.
    pub async fn set_activity_status(
        &self,
        id: &str,
        status: ActivityStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        User::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(user::Column::ActivityStatus, Expr::value(status))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Set a user's activity status only if it currently has the expected
    /// value. Returns the number of rows updated.
    pub async fn set_activity_status_if(
        &self,
        id: &str,
        expected: ActivityStatus,
        new: ActivityStatus,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = User::update_many()
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::ActivityStatus.eq(expected))
            .col_expr(user::Column::ActivityStatus, Expr::value(new))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Suspend a user: mark SUSPENDED_BY_ADMIN and disable the account.
    pub async fn suspend(&self, id: &str, now: DateTime<Utc>) -> AppResult<()> {
        User::update_many()
            .filter(user::Column::Id.eq(id))
            .col_expr(
                user::Column::ActivityStatus,
                Expr::value(ActivityStatus::SuspendedByAdmin),
            )
            .col_expr(user::Column::IsDisabled, Expr::value(true))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_user(id: &str, status: ActivityStatus) -> user::Model {
        user::Model {
            id: id.to_string(),
            first_name: "Jamie".to_string(),
            last_name: "Moreno".to_string(),
            email: format!("{id}@example.com"),
            token: Some(format!("token-{id}")),
            is_moderator: false,
            is_delivery_agent: false,
            activity_status: status,
            is_disabled: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let user = create_test_user("user1", ActivityStatus::Active);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("user1").await.unwrap();

        assert_eq!(result.id, "user1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_by_ids_empty_short_circuits() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = UserRepository::new(db);
        let result = repo.get_by_ids(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_set_activity_status_if_mismatch() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let rows = repo
            .set_activity_status_if(
                "user1",
                ActivityStatus::PendingReportReview,
                ActivityStatus::Active,
                Utc::now(),
            )
            .await
            .unwrap();

        // Status had already moved on; nothing restored.
        assert_eq!(rows, 0);
    }
}
