//! User service.

use rentmate_common::{AppError, AppResult};
use rentmate_db::{entities::user, repositories::UserRepository};

/// User directory operations needed by the moderation surface.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Resolve a bearer token to a user.
    ///
    /// Disabled accounts are treated the same as an unknown token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .get_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if user.is_disabled {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }
}
