//! Admin moderation endpoints. Every route requires an admin account.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use minsu_common::AppResult;
use minsu_db::entities::{moderation_log, post, report, user};
use serde::Deserialize;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Pagination query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageQuery {
    fn limit(&self) -> u64 {
        self.limit.unwrap_or(50).min(200)
    }

    fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Moderation queue query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueQuery {
    #[serde(default)]
    pub reported_only: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Posts awaiting moderation.
async fn queue(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<ApiResponse<Vec<post::Model>>> {
    let posts = state
        .moderation_service
        .queue(
            query.reported_only,
            query.limit.unwrap_or(50).min(200),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(ApiResponse::ok(posts))
}

/// Approve a post.
async fn approve_post(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<post::Model>> {
    let updated = state.moderation_service.approve_post(&admin.id, &post_id).await?;
    Ok(ApiResponse::ok(updated))
}

/// Mark a post reviewed.
async fn review_post(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<post::Model>> {
    let updated = state.moderation_service.review_post(&admin.id, &post_id).await?;
    Ok(ApiResponse::ok(updated))
}

/// Body carrying a moderation reason.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonBody {
    pub reason: String,
}

/// Decline and archive a post.
async fn decline_post(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<ReasonBody>,
) -> AppResult<ApiResponse<post::Model>> {
    let updated = state
        .moderation_service
        .decline_post(&admin.id, &post_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Reports filed against a post.
async fn post_reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<report::Model>>> {
    Ok(ApiResponse::ok(
        state.moderation_service.reports_for_post(&post_id).await?,
    ))
}

/// All reports, newest first.
async fn reports(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<report::Model>>> {
    Ok(ApiResponse::ok(
        state
            .moderation_service
            .list_reports(query.limit(), query.offset())
            .await?,
    ))
}

/// List accounts.
async fn users(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<user::Model>>> {
    Ok(ApiResponse::ok(
        state.user_service.list(query.limit(), query.offset()).await?,
    ))
}

/// Ban a user.
async fn ban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ReasonBody>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .moderation_service
        .ban_user(&admin.id, &user_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Lift a ban.
async fn unban_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.moderation_service.unban_user(&admin.id, &user_id).await?;
    Ok(ApiResponse::ok(updated))
}

/// Deactivate a user.
async fn deactivate_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ReasonBody>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .moderation_service
        .deactivate_user(&admin.id, &user_id, &req.reason)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Reactivate a user.
async fn activate_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state
        .moderation_service
        .activate_user(&admin.id, &user_id)
        .await?;
    Ok(ApiResponse::ok(updated))
}

/// Soft-delete a user.
async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.moderation_service.delete_user(&admin.id, &user_id).await?;
    Ok(ApiResponse::ok(updated))
}

/// Moderation log query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Moderation log entries, optionally filtered by target.
async fn logs(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> AppResult<ApiResponse<Vec<moderation_log::Model>>> {
    let entries = if let Some(post_id) = query.post_id {
        state.moderation_service.logs_for_post(&post_id).await?
    } else if let Some(user_id) = query.user_id {
        state.moderation_service.logs_for_user(&user_id).await?
    } else {
        state
            .moderation_service
            .logs(
                query.limit.unwrap_or(50).min(200),
                query.offset.unwrap_or(0),
            )
            .await?
    };
    Ok(ApiResponse::ok(entries))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(queue))
        .route("/posts/{post_id}/approve", post(approve_post))
        .route("/posts/{post_id}/review", post(review_post))
        .route("/posts/{post_id}/decline", post(decline_post))
        .route("/posts/{post_id}/reports", get(post_reports))
        .route("/reports", get(reports))
        .route("/users", get(users))
        .route("/users/{user_id}/ban", post(ban_user))
        .route("/users/{user_id}/unban", post(unban_user))
        .route("/users/{user_id}/deactivate", post(deactivate_user))
        .route("/users/{user_id}/activate", post(activate_user))
        .route("/users/{user_id}", delete(delete_user))
        .route("/logs", get(logs))
}
