//! Notification service.
//!
//! Reaction and comment events on the same post collapse into a single
//! unread notification per recipient; every other type gets its own row.

use minsu_common::{AppResult, IdGenerator};
use minsu_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::Set;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Deliver a notification to a recipient.
    ///
    /// Self-actions are dropped silently. Grouped types merge into the
    /// recipient's unread notification for the same post; the rest insert
    /// a fresh row.
    pub async fn notify(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        post_id: Option<&str>,
        payload: Option<&str>,
    ) -> AppResult<Option<notification::Model>> {
        if recipient_id == actor_id {
            return Ok(None);
        }

        let grouped = notification_type.is_grouped();
        let fresh = self.build(recipient_id, actor_id, notification_type, post_id, payload);

        let created = if grouped {
            self.notification_repo
                .merge_or_create(fresh, actor_id, payload)
                .await?
        } else {
            self.notification_repo.create(fresh).await?
        };

        Ok(Some(created))
    }

    /// Build the active model used by [`ModerationService`] to insert the
    /// author notification inside its own transaction.
    ///
    /// [`ModerationService`]: crate::services::ModerationService
    #[must_use]
    pub fn build(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        post_id: Option<&str>,
        payload: Option<&str>,
    ) -> notification::ActiveModel {
        notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            notification_type: Set(notification_type),
            post_id: Set(post_id.map(str::to_owned)),
            other_actor_ids: Set(serde_json::json!([])),
            payload: Set(payload.map(str::to_owned)),
            is_read: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        }
    }

    /// List notifications for a user.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_user(user_id, limit, until_id, unread_only)
            .await
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one notification as read. Only the recipient may do so.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let Some(n) = self.notification_repo.find_by_id(notification_id).await? else {
            return Err(minsu_common::AppError::NotFound(
                "Notification not found".to_string(),
            ));
        };
        if n.user_id != user_id {
            return Err(minsu_common::AppError::Forbidden);
        }
        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark every notification of a user as read.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Delete a notification. Only the recipient may do so.
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let Some(n) = self.notification_repo.find_by_id(notification_id).await? else {
            return Err(minsu_common::AppError::NotFound(
                "Notification not found".to_string(),
            ));
        };
        if n.user_id != user_id {
            return Err(minsu_common::AppError::Forbidden);
        }
        self.notification_repo.delete(notification_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn grouped_types_are_exactly_reaction_and_comment() {
        assert!(NotificationType::Reaction.is_grouped());
        assert!(NotificationType::Comment.is_grouped());
        assert!(!NotificationType::Approved.is_grouped());
        assert!(!NotificationType::Declined.is_grouped());
        assert!(!NotificationType::FriendRequest.is_grouped());
        assert!(!NotificationType::FriendAccepted.is_grouped());
        assert!(!NotificationType::Share.is_grouped());
    }

    #[tokio::test]
    async fn self_actions_never_notify() {
        use minsu_db::repositories::NotificationRepository;
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::Arc;

        // No query results are seeded; any repository call would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let result = service
            .notify("user1", "user1", NotificationType::Reaction, Some("post1"), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn build_starts_unread_with_no_other_actors() {
        use minsu_db::repositories::NotificationRepository;
        use sea_orm::{DatabaseBackend, MockDatabase};
        use std::sync::Arc;

        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = NotificationService::new(NotificationRepository::new(db));

        let model = service.build(
            "recipient",
            "actor",
            NotificationType::Comment,
            Some("post1"),
            Some("nice post"),
        );

        assert_eq!(model.is_read, Set(false));
        assert_eq!(model.other_actor_ids, Set(serde_json::json!([])));
        assert_eq!(model.payload, Set(Some("nice post".to_string())));
    }
}
