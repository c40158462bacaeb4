//! Report repository.

use std::sync::Arc;

use crate::entities::{Report, report};
use minsu_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Report repository for database operations.
#[derive(Clone)]
pub struct ReportRepository {
    db: Arc<DatabaseConnection>,
}

impl ReportRepository {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new report.
    pub async fn create(&self, model: report::ActiveModel) -> AppResult<report::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether a user has already reported a post.
    pub async fn exists(&self, post_id: &str, reporter_id: &str) -> AppResult<bool> {
        let count = Report::find()
            .filter(report::Column::PostId.eq(post_id))
            .filter(report::Column::ReporterId.eq(reporter_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Reports filed against a post, newest first.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<report::Model>> {
        Report::find()
            .filter(report::Column::PostId.eq(post_id))
            .order_by_desc(report::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reports against a post.
    pub async fn count_by_post(&self, post_id: &str) -> AppResult<u64> {
        Report::find()
            .filter(report::Column::PostId.eq(post_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all reports (paginated, newest first).
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<report::Model>> {
        Report::find()
            .order_by_desc(report::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
