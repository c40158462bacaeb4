//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use minsu_common::AppResult;
use minsu_db::entities::notification;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Notification listing query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    pub limit: Option<u64>,
    pub until_id: Option<String>,
    #[serde(default)]
    pub unread_only: bool,
}

/// List the caller's notifications.
async fn list(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<ApiResponse<Vec<notification::Model>>> {
    let notifications = state
        .notification_service
        .list(
            &account.id,
            query.limit.unwrap_or(30).min(100),
            query.until_id.as_deref(),
            query.unread_only,
        )
        .await?;
    Ok(ApiResponse::ok(notifications))
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// Count unread notifications.
async fn unread_count(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.unread_count(&account.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .notification_service
        .mark_as_read(&account.id, &notification_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

/// Mark all notifications as read.
async fn mark_all_read(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let updated = state
        .notification_service
        .mark_all_as_read(&account.id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "updated": updated })))
}

/// Delete a notification.
async fn remove(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .notification_service
        .delete(&account.id, &notification_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/{notification_id}/read", post(mark_read))
        .route("/{notification_id}", delete(remove))
}
