//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use minsu_common::AppResult;
use minsu_db::entities::post::{self, MediaType, PostStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// A post as shown to a viewer. Anonymous posts hide the author from
/// everyone but the author and admins; the id stays stored server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub user_id: Option<String>,
    pub content: String,
    pub media: Option<String>,
    pub media_type: Option<MediaType>,
    pub media_oversized: bool,
    pub is_anonymous: bool,
    pub status: PostStatus,
    pub archived: bool,
    pub likes_count: i32,
    pub comments_count: i32,
    pub shares_count: i32,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl PostView {
    /// Render a post for a viewer.
    #[must_use]
    pub fn for_viewer(found: post::Model, viewer_id: &str, is_admin: bool) -> Self {
        let show_author = !found.is_anonymous || found.user_id == viewer_id || is_admin;
        Self {
            id: found.id,
            user_id: show_author.then_some(found.user_id),
            content: found.content,
            media: found.media,
            media_type: found.media_type,
            media_oversized: found.media_oversized,
            is_anonymous: found.is_anonymous,
            status: found.status,
            archived: found.archived,
            likes_count: found.likes_count,
            comments_count: found.comments_count,
            shares_count: found.shares_count,
            created_at: found.created_at,
        }
    }
}

/// Pagination query for feeds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub limit: Option<u64>,
    pub until_id: Option<String>,
}

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

/// Submit a post.
async fn create_post(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<minsu_core::CreatePostInput>,
) -> AppResult<ApiResponse<PostView>> {
    let created = state.post_service.create(&account.id, req).await?;
    Ok(ApiResponse::ok(PostView::for_viewer(
        created,
        &account.id,
        account.is_admin,
    )))
}

/// The public feed.
async fn feed(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state
        .post_service
        .feed(clamp_limit(query.limit), query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        posts
            .into_iter()
            .map(|p| PostView::for_viewer(p, &account.id, account.is_admin))
            .collect(),
    ))
}

/// Get one post.
async fn get_post(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostView>> {
    let found = state
        .post_service
        .get(&post_id, &account.id, account.is_admin)
        .await?;
    Ok(ApiResponse::ok(PostView::for_viewer(
        found,
        &account.id,
        account.is_admin,
    )))
}

/// Posts of one user. Anonymous posts of others are not listed here.
async fn user_posts(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<PostView>>> {
    let posts = state
        .post_service
        .by_user(&user_id, clamp_limit(query.limit), query.until_id.as_deref())
        .await?;

    let own_or_admin = user_id == account.id || account.is_admin;
    Ok(ApiResponse::ok(
        posts
            .into_iter()
            .filter(|p| own_or_admin || !p.is_anonymous)
            .map(|p| PostView::for_viewer(p, &account.id, account.is_admin))
            .collect(),
    ))
}

/// Share a post.
async fn share_post(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.post_service.share(&account.id, &post_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

/// Report request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub reason: String,
}

/// Report a post.
async fn report_post(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<ReportRequest>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let created = state
        .post_service
        .report(&account.id, &post_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "id": created.id })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_post).get(feed))
        .route("/{post_id}", get(get_post))
        .route("/by-user/{user_id}", get(user_posts))
        .route("/{post_id}/share", post(share_post))
        .route("/{post_id}/report", post(report_post))
}
