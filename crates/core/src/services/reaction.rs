//! Reaction service.

use sea_orm::Set;

use crate::services::notification::NotificationService;
use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{
    entities::{notification::NotificationType, reaction},
    repositories::{PostRepository, ReactionRepository},
};

/// Reaction kinds the API accepts.
const ALLOWED_KINDS: &[&str] = &["like", "heart", "laugh", "wow", "sad"];

/// Reaction service for business logic.
#[derive(Clone)]
pub struct ReactionService {
    reaction_repo: ReactionRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ReactionService {
    /// Create a new reaction service.
    #[must_use]
    pub const fn new(
        reaction_repo: ReactionRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            reaction_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the caller's reaction on a post.
    ///
    /// A first reaction bumps `likes_count` and notifies the author; a
    /// repeated reaction only changes the stored kind.
    pub async fn set(&self, user_id: &str, post_id: &str, kind: &str) -> AppResult<reaction::Model> {
        if !ALLOWED_KINDS.contains(&kind) {
            return Err(AppError::Validation(format!("Unknown reaction kind: {kind}")));
        }

        let post = self.post_repo.get_by_id(post_id).await?;

        let existing = self
            .reaction_repo
            .find_by_post_and_user(post_id, user_id)
            .await?;

        let reacted = if let Some(current) = existing {
            if current.kind == kind {
                return Ok(current);
            }
            let mut active: reaction::ActiveModel = current.into();
            active.kind = Set(kind.to_string());
            self.reaction_repo.update(active).await?
        } else {
            let created = self
                .reaction_repo
                .create(reaction::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    post_id: Set(post_id.to_string()),
                    kind: Set(kind.to_string()),
                    created_at: Set(chrono::Utc::now().into()),
                })
                .await?;
            self.post_repo.adjust_likes_count(post_id, 1).await?;
            created
        };

        self.notifications
            .notify(
                &post.user_id,
                user_id,
                NotificationType::Reaction,
                Some(post_id),
                Some(kind),
            )
            .await?;

        Ok(reacted)
    }

    /// Remove the caller's reaction, if any.
    pub async fn remove(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        self.post_repo.get_by_id(post_id).await?;

        let Some(existing) = self
            .reaction_repo
            .find_by_post_and_user(post_id, user_id)
            .await?
        else {
            return Err(AppError::NotFound("No reaction to remove".to_string()));
        };

        self.reaction_repo.delete(existing).await?;
        self.post_repo.adjust_likes_count(post_id, -1).await?;

        Ok(())
    }

    /// List reactions on a post.
    pub async fn list(&self, post_id: &str) -> AppResult<Vec<reaction::Model>> {
        self.reaction_repo.find_by_post(post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn unknown_kind_is_rejected_before_any_lookup() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = ReactionService::new(
            ReactionRepository::new(Arc::clone(&db)),
            PostRepository::new(Arc::clone(&db)),
            NotificationService::new(minsu_db::repositories::NotificationRepository::new(db)),
        );

        let err = service.set("user1", "post1", "explode").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
