//! Friend request and friendship endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use minsu_common::AppResult;
use minsu_core::FriendshipView;
use minsu_db::entities::{friend_request, friendship};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Friend request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestBody {
    pub receiver_id: String,
}

/// Send a friend request.
async fn send_request(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<SendRequestBody>,
) -> AppResult<ApiResponse<friend_request::Model>> {
    let created = state
        .friendship_service
        .send_request(&account.id, &req.receiver_id)
        .await?;
    Ok(ApiResponse::ok(created))
}

/// Accept a friend request.
async fn accept_request(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<friendship::Model>> {
    let created = state
        .friendship_service
        .accept_request(&account.id, &request_id)
        .await?;
    Ok(ApiResponse::ok(created))
}

/// Decline or cancel a friend request.
async fn withdraw_request(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .friendship_service
        .withdraw_request(&account.id, &request_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

/// Incoming pending requests.
async fn incoming(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<friend_request::Model>>> {
    Ok(ApiResponse::ok(
        state.friendship_service.incoming(&account.id).await?,
    ))
}

/// Outgoing pending requests.
async fn outgoing(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<friend_request::Model>>> {
    Ok(ApiResponse::ok(
        state.friendship_service.outgoing(&account.id).await?,
    ))
}

/// The caller's friends.
async fn friends(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<FriendshipView>>> {
    Ok(ApiResponse::ok(
        state.friendship_service.friends(&account.id).await?,
    ))
}

/// Remove a friendship.
async fn unfriend(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .friendship_service
        .unfriend(&account.id, &user_id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(friends))
        .route("/requests", post(send_request))
        .route("/requests/incoming", get(incoming))
        .route("/requests/outgoing", get(outgoing))
        .route("/requests/{request_id}/accept", post(accept_request))
        .route("/requests/{request_id}", delete(withdraw_request))
        .route("/{user_id}", delete(unfriend))
}
