//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Feed of visible posts (approved or still pending review), paginated by ID.
    pub async fn find_feed(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::Archived.eq(false))
            .filter(
                post::Column::Status
                    .is_in([post::PostStatus::Pending, post::PostStatus::Approved, post::PostStatus::Reviewed]),
            )
            .order_by_desc(post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts authored by a user (paginated).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Posts awaiting moderation (pending or reported), for the admin queue.
    pub async fn find_moderation_queue(
        &self,
        reported_only: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post::Model>> {
        let mut query = Post::find().filter(post::Column::Archived.eq(false));

        query = if reported_only {
            query.filter(post::Column::IsReported.eq(true))
        } else {
            query.filter(
                post::Column::IsReported
                    .eq(true)
                    .or(post::Column::Status.eq(post::PostStatus::Pending)),
            )
        };

        query
            .order_by_asc(post::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts awaiting moderation.
    pub async fn count_pending(&self) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::Status.eq(post::PostStatus::Pending))
            .filter(post::Column::Archived.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Adjust the likes counter atomically (single UPDATE query, no fetch).
    pub async fn adjust_likes_count(&self, post_id: &str, delta: i32) -> AppResult<()> {
        self.adjust_count(post_id, post::Column::LikesCount, delta)
            .await
    }

    /// Adjust the comments counter atomically.
    pub async fn adjust_comments_count(&self, post_id: &str, delta: i32) -> AppResult<()> {
        self.adjust_count(post_id, post::Column::CommentsCount, delta)
            .await
    }

    /// Increment the shares counter atomically.
    pub async fn increment_shares_count(&self, post_id: &str) -> AppResult<()> {
        self.adjust_count(post_id, post::Column::SharesCount, 1)
            .await
    }

    async fn adjust_count(
        &self,
        post_id: &str,
        column: post::Column,
        delta: i32,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .filter(post::Column::Id.eq(post_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
