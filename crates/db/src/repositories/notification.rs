//! Notification repository.

use std::sync::Arc;

use crate::entities::{Notification, notification};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new notification.
    pub async fn create(&self, model: notification::ActiveModel) -> AppResult<notification::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Merge an event into the unread notification for
    /// (recipient, post, type), or insert a fresh one.
    ///
    /// Runs in a transaction with a row lock on the existing notification.
    /// The first event has no row to lock, so the insert is backed by a
    /// partial unique index on the unread key; losing that race surfaces as
    /// a unique violation and the second pass merges into the winner's row.
    pub async fn merge_or_create(
        &self,
        fresh: notification::ActiveModel,
        actor_id: &str,
        payload: Option<&str>,
    ) -> AppResult<notification::Model> {
        let user_id = match &fresh.user_id {
            Set(id) => id.clone(),
            _ => return Err(AppError::Internal("notification missing user_id".into())),
        };
        let post_id = match &fresh.post_id {
            Set(Some(id)) => id.clone(),
            _ => return Err(AppError::Internal("grouped notification missing post_id".into())),
        };
        let notification_type = match &fresh.notification_type {
            Set(t) => t.clone(),
            _ => {
                return Err(AppError::Internal(
                    "notification missing notification_type".into(),
                ));
            }
        };

        for _ in 0..2 {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            let existing = Notification::find()
                .filter(notification::Column::UserId.eq(&user_id))
                .filter(notification::Column::PostId.eq(&post_id))
                .filter(notification::Column::NotificationType.eq(notification_type.clone()))
                .filter(notification::Column::IsRead.eq(false))
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if let Some(current) = existing {
                let mut others = current.other_actors();
                let already_known =
                    current.actor_id == actor_id || others.iter().any(|id| id == actor_id);
                if !already_known {
                    others.push(actor_id.to_owned());
                }

                let mut active: notification::ActiveModel = current.into();
                active.other_actor_ids = Set(serde_json::json!(others));
                active.payload = Set(payload.map(str::to_owned));
                active.updated_at = Set(Some(chrono::Utc::now().into()));
                let merged = active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                txn.commit()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                return Ok(merged);
            }

            match fresh.clone().insert(&txn).await {
                Ok(created) => {
                    txn.commit()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                    return Ok(created);
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    // Lost the first-insert race; the winner's row exists now.
                    txn.rollback()
                        .await
                        .map_err(|e| AppError::Database(e.to_string()))?;
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        }

        Err(AppError::Database(
            "notification merge did not converge".into(),
        ))
    }

    /// Delete a notification.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let notification = self.find_by_id(id).await?;
        if let Some(n) = notification {
            n.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get notifications for a user (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let mut query = Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(notification::Column::Id.lt(id));
        }

        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        let notification = self.find_by_id(id).await?;
        if let Some(n) = notification {
            let mut active: notification::ActiveModel = n.into();
            active.is_read = Set(true);
            active
                .update(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        use sea_orm::UpdateResult;
        use sea_orm::sea_query::Expr;

        let result: UpdateResult = Notification::update_many()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::notification::NotificationType;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn unread_reaction(id: &str, user_id: &str, actor_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            actor_id: actor_id.to_string(),
            notification_type: NotificationType::Reaction,
            post_id: Some("post1".to_string()),
            other_actor_ids: serde_json::json!([]),
            payload: Some("like".to_string()),
            is_read: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn fresh_reaction(user_id: &str, actor_id: &str) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set("n2".to_string()),
            user_id: Set(user_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            notification_type: Set(NotificationType::Reaction),
            post_id: Set(Some("post1".to_string())),
            other_actor_ids: Set(serde_json::json!([])),
            payload: Set(Some("love".to_string())),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        }
    }

    #[tokio::test]
    async fn second_reactor_merges_into_the_unread_row() {
        let existing = unread_reaction("n1", "author", "actor1");
        let mut merged = existing.clone();
        merged.other_actor_ids = serde_json::json!(["actor2"]);
        merged.payload = Some("love".to_string());
        merged.updated_at = Some(Utc::now().into());

        // One SELECT ... FOR UPDATE, one UPDATE, nothing else.
        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[merged]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(std::sync::Arc::clone(&db));
        let result = repo
            .merge_or_create(fresh_reaction("author", "actor2"), "actor2", Some("love"))
            .await
            .unwrap();

        assert_eq!(result.id, "n1");
        assert_eq!(result.other_actors(), vec!["actor2".to_string()]);

        // The UPDATE must carry the appended actor list, not the fresh row.
        drop(repo);
        let log = std::sync::Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        assert!(statements.contains("actor2"));
        assert!(!statements.contains("INSERT"));
    }

    #[tokio::test]
    async fn known_actor_updates_payload_without_duplicating() {
        let mut existing = unread_reaction("n1", "author", "actor1");
        existing.other_actor_ids = serde_json::json!(["actor2"]);
        let merged = existing.clone();

        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_query_results([[merged]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(std::sync::Arc::clone(&db));
        let result = repo
            .merge_or_create(fresh_reaction("author", "actor2"), "actor2", Some("love"))
            .await
            .unwrap();

        assert_eq!(result.other_actors(), vec!["actor2".to_string()]);

        drop(repo);
        let log = std::sync::Arc::try_unwrap(db).unwrap().into_transaction_log();
        // The UPDATE carries the actor list once; a duplicate append would
        // put "actor2" in the bound values a second time.
        let statements = format!("{log:?}");
        assert_eq!(statements.matches("actor2").count(), 1);
    }

    #[tokio::test]
    async fn first_event_inserts_a_fresh_row() {
        let created = unread_reaction("n2", "author", "actor1");

        let db = std::sync::Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<notification::Model>::new()])
                .append_query_results([[created]])
                .into_connection(),
        );

        let repo = NotificationRepository::new(db);
        let result = repo
            .merge_or_create(fresh_reaction("author", "actor1"), "actor1", Some("like"))
            .await
            .unwrap();

        assert_eq!(result.id, "n2");
        assert!(result.other_actors().is_empty());
        assert!(!result.is_read);
    }
}
