//! Comment endpoints, nested under `/posts`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, post},
};
use minsu_common::AppResult;
use minsu_db::entities::comment;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Pagination query for comment listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentQuery {
    pub limit: Option<u64>,
    pub since_id: Option<String>,
}

/// Append a comment to a post.
async fn create_comment(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<minsu_core::CreateCommentInput>,
) -> AppResult<ApiResponse<comment::Model>> {
    let created = state
        .comment_service
        .create(&account.id, &post_id, req)
        .await?;
    Ok(ApiResponse::ok(created))
}

/// List comments on a post.
async fn list_comments(
    AuthUser(_account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(query): Query<CommentQuery>,
) -> AppResult<ApiResponse<Vec<comment::Model>>> {
    let comments = state
        .comment_service
        .list(&post_id, query.limit.unwrap_or(50).min(200), query.since_id.as_deref())
        .await?;
    Ok(ApiResponse::ok(comments))
}

/// Delete a comment.
async fn delete_comment(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path((_post_id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .comment_service
        .delete(&account.id, &comment_id, account.is_admin)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{post_id}/comments",
            post(create_comment).get(list_comments),
        )
        .route("/{post_id}/comments/{comment_id}", delete(delete_comment))
}
