//! Login session repository.

use std::sync::Arc;

use crate::entities::{LoginSession, login_session};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

/// Login session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<login_session::Model>> {
        LoginSession::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an active session by its bearer token.
    pub async fn find_active_by_token(
        &self,
        token: &str,
    ) -> AppResult<Option<login_session::Model>> {
        LoginSession::find()
            .filter(login_session::Column::Token.eq(token))
            .filter(login_session::Column::RevokedAt.is_null())
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(
        &self,
        model: login_session::ActiveModel,
    ) -> AppResult<login_session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active (non-revoked) sessions for a user, most recently seen first.
    pub async fn find_active_by_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<login_session::Model>> {
        LoginSession::find()
            .filter(login_session::Column::UserId.eq(user_id))
            .filter(login_session::Column::RevokedAt.is_null())
            .order_by_desc(login_session::Column::LastSeenAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Refresh `last_seen_at` without fetching the row.
    pub async fn touch_last_seen(&self, session_id: &str) -> AppResult<()> {
        LoginSession::update_many()
            .col_expr(
                login_session::Column::LastSeenAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(login_session::Column::Id.eq(session_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mark a session revoked. Idempotent for already revoked sessions.
    pub async fn revoke(&self, session_id: &str) -> AppResult<()> {
        LoginSession::update_many()
            .col_expr(
                login_session::Column::RevokedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(login_session::Column::Id.eq(session_id))
            .filter(login_session::Column::RevokedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Revoke every active session of a user (used at sign-out everywhere
    /// and when an account is banned or deactivated).
    pub async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = LoginSession::update_many()
            .col_expr(
                login_session::Column::RevokedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(login_session::Column::UserId.eq(user_id))
            .filter(login_session::Column::RevokedAt.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}
