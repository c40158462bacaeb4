//! Moderation log repository (append-only, with transactional write helpers).

use std::sync::Arc;

use crate::entities::{ModerationLog, moderation_log, notification, post, user};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

/// Moderation log repository for database operations.
///
/// Log rows are only ever inserted. There is no update or delete path.
#[derive(Clone)]
pub struct ModerationLogRepository {
    db: Arc<DatabaseConnection>,
}

impl ModerationLogRepository {
    /// Create a new moderation log repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a log entry.
    pub async fn create(
        &self,
        model: moderation_log::ActiveModel,
    ) -> AppResult<moderation_log::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a post status transition, its log entry, and the author
    /// notification in one transaction.
    pub async fn transition_post(
        &self,
        post: post::ActiveModel,
        log: moderation_log::ActiveModel,
        author_notification: Option<notification::ActiveModel>,
    ) -> AppResult<post::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = post
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        log.insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(n) = author_notification {
            n.insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Apply a user account change and its log entry in one transaction.
    pub async fn transition_user(
        &self,
        user: user::ActiveModel,
        log: moderation_log::ActiveModel,
    ) -> AppResult<user::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = user
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        log.insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// List log entries, newest first (paginated).
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<moderation_log::Model>> {
        ModerationLog::find()
            .order_by_desc(moderation_log::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Log entries targeting a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<moderation_log::Model>> {
        ModerationLog::find()
            .filter(moderation_log::Column::TargetPostId.eq(post_id))
            .order_by_desc(moderation_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Log entries targeting a user, newest first.
    pub async fn find_by_target_user(
        &self,
        user_id: &str,
    ) -> AppResult<Vec<moderation_log::Model>> {
        ModerationLog::find()
            .filter(moderation_log::Column::TargetUserId.eq(user_id))
            .order_by_desc(moderation_log::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
