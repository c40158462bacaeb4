//! Comment service.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::notification::NotificationService;
use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{
    entities::{comment, notification::NotificationType},
    repositories::{CommentRepository, PostRepository},
};

/// Longest comment excerpt carried in a notification payload.
const EXCERPT_LEN: usize = 80;

/// Input for creating a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2000, message = "Comment content is required"))]
    pub content: String,
}

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        post_repo: PostRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append a comment to a post, bump its counter and notify the author.
    pub async fn create(
        &self,
        user_id: &str,
        post_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<comment::Model> {
        input.validate()?;

        let content = input.content.trim().to_owned();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment content is required".to_string(),
            ));
        }

        let post = self.post_repo.get_by_id(post_id).await?;

        let created = self
            .comment_repo
            .create(comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                user_id: Set(user_id.to_string()),
                content: Set(content),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        self.post_repo.adjust_comments_count(post_id, 1).await?;

        self.notifications
            .notify(
                &post.user_id,
                user_id,
                NotificationType::Comment,
                Some(post_id),
                Some(&excerpt(&created.content)),
            )
            .await?;

        Ok(created)
    }

    /// Delete a comment. Allowed for the comment author and for admins.
    pub async fn delete(&self, user_id: &str, comment_id: &str, is_admin: bool) -> AppResult<()> {
        let Some(found) = self.comment_repo.find_by_id(comment_id).await? else {
            return Err(AppError::NotFound("Comment not found".to_string()));
        };

        if found.user_id != user_id && !is_admin {
            return Err(AppError::Forbidden);
        }

        let post_id = found.post_id.clone();
        self.comment_repo.delete(found).await?;
        self.post_repo.adjust_comments_count(&post_id, -1).await?;

        Ok(())
    }

    /// Comments on a post.
    pub async fn list(
        &self,
        post_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<comment::Model>> {
        self.comment_repo.find_by_post(post_id, limit, since_id).await
    }
}

/// First `EXCERPT_LEN` characters of a comment, on a char boundary.
fn excerpt(content: &str) -> String {
    if content.chars().count() <= EXCERPT_LEN {
        content.to_owned()
    } else {
        let cut: String = content.chars().take(EXCERPT_LEN).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_comments_intact() {
        assert_eq!(excerpt("nice one"), "nice one");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let long = "á".repeat(120);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_LEN + 1);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn blank_comment_fails_validation() {
        let input = CreateCommentInput {
            content: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
