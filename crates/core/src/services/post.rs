//! Post service: submission, feed, sharing and reporting.

use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::media::MediaService;
use crate::services::notification::NotificationService;
use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{
    entities::{
        notification::NotificationType,
        post::{self, MediaType, PostStatus},
        report,
    },
    repositories::{PostRepository, ReportRepository},
};

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(max = 10000, message = "Post content too long"))]
    #[serde(default)]
    pub content: String,

    /// Optional media payload as a base64 data URI.
    pub media: Option<String>,

    pub media_type: Option<MediaType>,

    #[serde(default)]
    pub is_anonymous: bool,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    report_repo: ReportRepository,
    media: MediaService,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        report_repo: ReportRepository,
        media: MediaService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            post_repo,
            report_repo,
            media,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Submit a new post. It always enters the moderation queue as
    /// `pending` with zeroed counters, anonymous or not.
    pub async fn create(&self, user_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;

        let content = input.content.trim().to_owned();
        if content.is_empty() && input.media.is_none() {
            return Err(AppError::Validation(
                "A post needs text or a media attachment".to_string(),
            ));
        }

        let mut media_oversized = false;
        let media = match (input.media, input.media_type) {
            (None, _) => None,
            (Some(_), None) => {
                return Err(AppError::BadRequest(
                    "mediaType is required when media is present".to_string(),
                ));
            }
            (Some(uri), Some(MediaType::Image)) => {
                let prepared = self.media.prepare_image(&uri);
                media_oversized = prepared.oversized;
                Some(prepared.data_uri)
            }
            (Some(uri), Some(MediaType::Video)) => {
                self.media.check_video(&uri)?;
                Some(uri)
            }
        };

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(content),
            media: Set(media),
            media_type: Set(input.media_type),
            media_oversized: Set(media_oversized),
            is_anonymous: Set(input.is_anonymous),
            status: Set(PostStatus::Pending),
            is_reported: Set(false),
            archived: Set(false),
            likes_count: Set(0),
            comments_count: Set(0),
            shares_count: Set(0),
            decline_reason: Set(None),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            declined_by: Set(None),
            declined_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.post_repo.create(model).await?;

        if created.media_oversized {
            tracing::warn!(post_id = %created.id, "post stored with oversized media");
        }

        Ok(created)
    }

    /// Get a post by ID. Archived posts are only visible to their author
    /// and to admins.
    pub async fn get(&self, post_id: &str, viewer_id: &str, is_admin: bool) -> AppResult<post::Model> {
        let found = self.post_repo.get_by_id(post_id).await?;
        if found.archived && found.user_id != viewer_id && !is_admin {
            return Err(AppError::PostNotFound(post_id.to_string()));
        }
        Ok(found)
    }

    /// The public feed of non-archived posts.
    pub async fn feed(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_feed(limit, until_id).await
    }

    /// Posts authored by a user.
    pub async fn by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo.find_by_user(user_id, limit, until_id).await
    }

    /// Share a post: bump the counter and notify the author.
    pub async fn share(&self, user_id: &str, post_id: &str) -> AppResult<()> {
        let found = self.post_repo.get_by_id(post_id).await?;

        self.post_repo.increment_shares_count(post_id).await?;
        self.notifications
            .notify(
                &found.user_id,
                user_id,
                NotificationType::Share,
                Some(post_id),
                None,
            )
            .await?;

        Ok(())
    }

    /// Report a post. Each user may report a given post once.
    pub async fn report(
        &self,
        reporter_id: &str,
        post_id: &str,
        reason: &str,
    ) -> AppResult<report::Model> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A report needs a reason".to_string(),
            ));
        }

        let found = self.post_repo.get_by_id(post_id).await?;

        if self.report_repo.exists(post_id, reporter_id).await? {
            return Err(AppError::Conflict(
                "You have already reported this post".to_string(),
            ));
        }

        let created = self
            .report_repo
            .create(report::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                reporter_id: Set(reporter_id.to_string()),
                reason: Set(reason.to_string()),
                created_at: Set(chrono::Utc::now().into()),
            })
            .await?;

        if !found.is_reported {
            let mut active: post::ActiveModel = found.into();
            active.is_reported = Set(true);
            self.post_repo.update(active).await?;
        }

        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use minsu_db::entities::post;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service_with(posts: Vec<Vec<post::Model>>) -> PostService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(posts)
                .into_connection(),
        );
        PostService::new(
            PostRepository::new(Arc::clone(&db)),
            ReportRepository::new(Arc::clone(&db)),
            MediaService::new(900 * 1024),
            NotificationService::new(minsu_db::repositories::NotificationRepository::new(db)),
        )
    }

    fn stored_post(content: &str) -> post::Model {
        post::Model {
            id: "01post0000000000000000000000".to_string(),
            user_id: "01user0000000000000000000000".to_string(),
            content: content.to_string(),
            media: None,
            media_type: None,
            media_oversized: false,
            is_anonymous: false,
            status: PostStatus::Pending,
            is_reported: false,
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
    async fn empty_post_without_media_is_rejected() {
        let service = service_with(vec![]);
        let err = service
            .create(
                "user1",
                CreatePostInput {
                    content: "   ".to_string(),
                    media: None,
                    media_type: None,
                    is_anonymous: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn media_without_type_is_rejected() {
        let service = service_with(vec![]);
        let err = service
            .create(
                "user1",
                CreatePostInput {
                    content: "hi".to_string(),
                    media: Some("data:image/png;base64,AAAA".to_string()),
                    media_type: None,
                    is_anonymous: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn text_post_is_stored_pending_with_zero_counts() {
        let service = service_with(vec![vec![stored_post("Hello")]]);
        let created = service
            .create(
                "user1",
                CreatePostInput {
                    content: "Hello".to_string(),
                    media: None,
                    media_type: None,
                    is_anonymous: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.content, "Hello");
        assert_eq!(created.status, PostStatus::Pending);
        assert_eq!(created.likes_count, 0);
        assert_eq!(created.comments_count, 0);
        assert_eq!(created.shares_count, 0);
    }

    #[tokio::test]
    async fn anonymous_post_is_still_pending() {
        let mut expected = stored_post("anon");
        expected.is_anonymous = true;
        let service = service_with(vec![vec![expected]]);

        let created = service
            .create(
                "user1",
                CreatePostInput {
                    content: "anon".to_string(),
                    media: None,
                    media_type: None,
                    is_anonymous: true,
                },
            )
            .await
            .unwrap();

        assert!(created.is_anonymous);
        assert_eq!(created.status, PostStatus::Pending);
    }

    #[tokio::test]
    async fn report_requires_a_reason() {
        let service = service_with(vec![]);
        let err = service.report("user1", "post1", "  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
