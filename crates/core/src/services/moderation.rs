//! Moderation service: post review workflow, user management, audit log.

use sea_orm::Set;

use crate::services::notification::NotificationService;
use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{
    entities::{
        moderation_log::{self, ModerationAction},
        notification::NotificationType,
        post::{self, PostStatus},
        report, user,
    },
    repositories::{
        ModerationLogRepository, PostRepository, ReportRepository, SessionRepository,
        UserRepository,
    },
};

/// Moderation service for business logic.
///
/// Post transitions and user flag flips each run in one transaction with
/// their audit log entry, so the log never diverges from the data.
#[derive(Clone)]
pub struct ModerationService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    report_repo: ReportRepository,
    log_repo: ModerationLogRepository,
    session_repo: SessionRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        report_repo: ReportRepository,
        log_repo: ModerationLogRepository,
        session_repo: SessionRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            report_repo,
            log_repo,
            session_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    // ========== Post workflow ==========

    /// Posts awaiting moderation.
    pub async fn queue(
        &self,
        reported_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_moderation_queue(reported_only, limit, offset)
            .await
    }

    /// Approve a post and notify its author.
    pub async fn approve_post(&self, moderator_id: &str, post_id: &str) -> AppResult<post::Model> {
        let found = self.transitionable(post_id).await?;
        let snapshot = snapshot_of(&found);
        let author_id = found.user_id.clone();

        let mut active: post::ActiveModel = found.into();
        active.status = Set(PostStatus::Approved);
        active.is_reported = Set(false);
        active.reviewed_by = Set(Some(moderator_id.to_string()));
        active.reviewed_at = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::ApprovePost,
            Some(post_id),
            None,
            None,
            Some(snapshot),
        );

        let notification = (author_id != moderator_id).then(|| {
            self.notifications.build(
                &author_id,
                moderator_id,
                NotificationType::Approved,
                Some(post_id),
                None,
            )
        });

        self.log_repo.transition_post(active, log, notification).await
    }

    /// Mark a post reviewed: clears the reported flag, keeps it visible.
    pub async fn review_post(&self, moderator_id: &str, post_id: &str) -> AppResult<post::Model> {
        let found = self.transitionable(post_id).await?;
        let snapshot = snapshot_of(&found);

        let mut active: post::ActiveModel = found.into();
        active.status = Set(PostStatus::Reviewed);
        active.is_reported = Set(false);
        active.reviewed_by = Set(Some(moderator_id.to_string()));
        active.reviewed_at = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::ReviewPost,
            Some(post_id),
            None,
            None,
            Some(snapshot),
        );

        self.log_repo.transition_post(active, log, None).await
    }

    /// Decline and archive a post. Requires a non-empty reason; nothing is
    /// written when the reason is blank.
    pub async fn decline_post(
        &self,
        moderator_id: &str,
        post_id: &str,
        reason: &str,
    ) -> AppResult<post::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A decline reason is required".to_string(),
            ));
        }

        let found = self.transitionable(post_id).await?;
        let snapshot = snapshot_of(&found);
        let author_id = found.user_id.clone();

        let mut active: post::ActiveModel = found.into();
        active.status = Set(PostStatus::Declined);
        active.archived = Set(true);
        active.is_reported = Set(false);
        active.decline_reason = Set(Some(reason.to_string()));
        active.declined_by = Set(Some(moderator_id.to_string()));
        active.declined_at = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::DeclinePost,
            Some(post_id),
            None,
            Some(reason),
            Some(snapshot),
        );

        let notification = (author_id != moderator_id).then(|| {
            self.notifications.build(
                &author_id,
                moderator_id,
                NotificationType::Declined,
                Some(post_id),
                Some(reason),
            )
        });

        self.log_repo.transition_post(active, log, notification).await
    }

    /// Reports filed against a post.
    pub async fn reports_for_post(&self, post_id: &str) -> AppResult<Vec<report::Model>> {
        self.report_repo.find_by_post(post_id).await
    }

    /// All reports, newest first.
    pub async fn list_reports(&self, limit: u64, offset: u64) -> AppResult<Vec<report::Model>> {
        self.report_repo.list(limit, offset).await
    }

    // ========== User management ==========

    /// Ban a user. Requires a reason; admins cannot be banned.
    pub async fn ban_user(
        &self,
        moderator_id: &str,
        user_id: &str,
        reason: &str,
    ) -> AppResult<user::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("A ban reason is required".to_string()));
        }

        let target = self.actionable_target(moderator_id, user_id).await?;
        if target.is_admin {
            return Err(AppError::Forbidden);
        }

        let mut active: user::ActiveModel = target.into();
        active.is_banned = Set(true);
        active.ban_reason = Set(Some(reason.to_string()));
        active.banned_by = Set(Some(moderator_id.to_string()));
        active.banned_at = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::BanUser,
            None,
            Some(user_id),
            Some(reason),
            None,
        );

        let banned = self.log_repo.transition_user(active, log).await?;
        self.session_repo.revoke_all_for_user(user_id).await?;
        Ok(banned)
    }

    /// Lift a ban.
    pub async fn unban_user(&self, moderator_id: &str, user_id: &str) -> AppResult<user::Model> {
        let target = self.actionable_target(moderator_id, user_id).await?;

        let mut active: user::ActiveModel = target.into();
        active.is_banned = Set(false);
        active.ban_reason = Set(None);
        active.banned_by = Set(None);
        active.banned_at = Set(None);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::UnbanUser,
            None,
            Some(user_id),
            None,
            None,
        );

        self.log_repo.transition_user(active, log).await
    }

    /// Deactivate a user. Requires a reason.
    pub async fn deactivate_user(
        &self,
        moderator_id: &str,
        user_id: &str,
        reason: &str,
    ) -> AppResult<user::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A deactivation reason is required".to_string(),
            ));
        }

        let target = self.actionable_target(moderator_id, user_id).await?;

        let mut active: user::ActiveModel = target.into();
        active.is_deactivated = Set(true);
        active.deactivate_reason = Set(Some(reason.to_string()));
        active.deactivated_by = Set(Some(moderator_id.to_string()));
        active.deactivated_at = Set(Some(chrono::Utc::now().into()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::DeactivateUser,
            None,
            Some(user_id),
            Some(reason),
            None,
        );

        let deactivated = self.log_repo.transition_user(active, log).await?;
        self.session_repo.revoke_all_for_user(user_id).await?;
        Ok(deactivated)
    }

    /// Reactivate a user.
    pub async fn activate_user(&self, moderator_id: &str, user_id: &str) -> AppResult<user::Model> {
        let target = self.actionable_target(moderator_id, user_id).await?;

        let mut active: user::ActiveModel = target.into();
        active.is_deactivated = Set(false);
        active.deactivate_reason = Set(None);
        active.deactivated_by = Set(None);
        active.deactivated_at = Set(None);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::ActivateUser,
            None,
            Some(user_id),
            None,
            None,
        );

        self.log_repo.transition_user(active, log).await
    }

    /// Soft-delete a user. The row stays; the account can never log in.
    pub async fn delete_user(&self, moderator_id: &str, user_id: &str) -> AppResult<user::Model> {
        let target = self.actionable_target(moderator_id, user_id).await?;
        if target.is_admin {
            return Err(AppError::Forbidden);
        }

        let mut active: user::ActiveModel = target.into();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let log = self.log_entry(
            moderator_id,
            ModerationAction::DeleteUser,
            None,
            Some(user_id),
            None,
            None,
        );

        let deleted = self.log_repo.transition_user(active, log).await?;
        self.session_repo.revoke_all_for_user(user_id).await?;
        Ok(deleted)
    }

    // ========== Audit log ==========

    /// Moderation log entries, newest first.
    pub async fn logs(&self, limit: u64, offset: u64) -> AppResult<Vec<moderation_log::Model>> {
        self.log_repo.list(limit, offset).await
    }

    /// Log entries targeting a post.
    pub async fn logs_for_post(&self, post_id: &str) -> AppResult<Vec<moderation_log::Model>> {
        self.log_repo.find_by_post(post_id).await
    }

    /// Log entries targeting a user.
    pub async fn logs_for_user(&self, user_id: &str) -> AppResult<Vec<moderation_log::Model>> {
        self.log_repo.find_by_target_user(user_id).await
    }

    // ========== Internals ==========

    /// Fetch a post that may still be transitioned.
    async fn transitionable(&self, post_id: &str) -> AppResult<post::Model> {
        let found = self.post_repo.get_by_id(post_id).await?;
        if found.archived {
            return Err(AppError::Conflict(
                "Post is archived and can no longer be moderated".to_string(),
            ));
        }
        Ok(found)
    }

    /// Fetch a user-management target, rejecting self-moderation.
    async fn actionable_target(&self, moderator_id: &str, user_id: &str) -> AppResult<user::Model> {
        if moderator_id == user_id {
            return Err(AppError::BadRequest(
                "Moderators cannot act on their own account".to_string(),
            ));
        }
        self.user_repo.get_by_id(user_id).await
    }

    fn log_entry(
        &self,
        moderator_id: &str,
        action: ModerationAction,
        target_post_id: Option<&str>,
        target_user_id: Option<&str>,
        reason: Option<&str>,
        snapshot: Option<serde_json::Value>,
    ) -> moderation_log::ActiveModel {
        moderation_log::ActiveModel {
            id: Set(self.id_gen.generate()),
            moderator_id: Set(moderator_id.to_string()),
            action: Set(action),
            target_post_id: Set(target_post_id.map(str::to_owned)),
            target_user_id: Set(target_user_id.map(str::to_owned)),
            reason: Set(reason.map(str::to_owned)),
            snapshot: Set(snapshot),
            created_at: Set(chrono::Utc::now().into()),
        }
    }
}

/// Content snapshot stored with each post transition.
fn snapshot_of(post: &post::Model) -> serde_json::Value {
    serde_json::json!({
        "content": post.content,
        "mediaType": post.media_type,
        "isAnonymous": post.is_anonymous,
        "status": post.status,
        "isReported": post.is_reported,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use minsu_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_over(db: Arc<sea_orm::DatabaseConnection>) -> ModerationService {
        ModerationService::new(
            PostRepository::new(Arc::clone(&db)),
            UserRepository::new(Arc::clone(&db)),
            ReportRepository::new(Arc::clone(&db)),
            ModerationLogRepository::new(Arc::clone(&db)),
            SessionRepository::new(Arc::clone(&db)),
            NotificationService::new(NotificationRepository::new(db)),
        )
    }

    fn bare_service() -> ModerationService {
        service_over(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ))
    }

    fn pending_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            user_id: author_id.to_string(),
            content: "hello".to_string(),
            media: None,
            media_type: None,
            media_oversized: false,
            is_anonymous: false,
            status: PostStatus::Pending,
            is_reported: true,
            archived: false,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            decline_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            declined_by: None,
            declined_at: None,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn blank_decline_reason_writes_nothing() {
        // The mock connection has no seeded results, so any database call
        // would fail. The error must come from validation alone.
        let service = bare_service();
        let err = service
            .decline_post("admin1", "post1", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_ban_reason_writes_nothing() {
        let service = bare_service();
        let err = service.ban_user("admin1", "user1", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn moderators_cannot_ban_themselves() {
        let service = bare_service();
        let err = service
            .ban_user("admin1", "admin1", "spam")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn decline_archives_logs_and_notifies_the_author() {
        use minsu_db::entities::notification::{self, NotificationType};

        let pending = pending_post("post1", "author1");

        let mut declined = pending.clone();
        declined.status = PostStatus::Declined;
        declined.archived = true;
        declined.is_reported = false;
        declined.decline_reason = Some("spam".to_string());
        declined.declined_by = Some("admin1".to_string());
        declined.declined_at = Some(chrono::Utc::now().into());

        let log_row = moderation_log::Model {
            id: "log1".to_string(),
            moderator_id: "admin1".to_string(),
            action: ModerationAction::DeclinePost,
            target_post_id: Some("post1".to_string()),
            target_user_id: None,
            reason: Some("spam".to_string()),
            snapshot: Some(snapshot_of(&pending)),
            created_at: chrono::Utc::now().into(),
        };

        let author_note = notification::Model {
            id: "n1".to_string(),
            user_id: "author1".to_string(),
            actor_id: "admin1".to_string(),
            notification_type: NotificationType::Declined,
            post_id: Some("post1".to_string()),
            other_actor_ids: serde_json::json!([]),
            payload: Some("spam".to_string()),
            is_read: false,
            created_at: chrono::Utc::now().into(),
            updated_at: None,
        };

        // One SELECT for the post, then the transition transaction: the
        // post update, the log insert, and the author notification insert.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[pending]])
                .append_query_results([[declined]])
                .append_query_results([[log_row]])
                .append_query_results([[author_note]])
                .into_connection(),
        );

        let service = service_over(Arc::clone(&db));
        let result = service.decline_post("admin1", "post1", "spam").await.unwrap();

        assert_eq!(result.status, PostStatus::Declined);
        assert!(result.archived);
        assert_eq!(result.decline_reason.as_deref(), Some("spam"));

        drop(service);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let statements = format!("{log:?}");
        assert_eq!(statements.matches("INSERT").count(), 2);
        assert!(statements.contains("moderation_log"));
        assert!(statements.contains("notification"));
    }

    #[test]
    fn snapshot_captures_content_and_state() {
        let post = post::Model {
            is_anonymous: true,
            ..pending_post("p", "u")
        };

        let snap = snapshot_of(&post);
        assert_eq!(snap["content"], "hello");
        assert_eq!(snap["isAnonymous"], true);
        assert_eq!(snap["isReported"], true);
    }
}
