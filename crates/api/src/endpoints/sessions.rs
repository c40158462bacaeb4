//! Login session endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get},
};
use minsu_common::AppResult;
use minsu_core::SessionView;

use crate::{
    extractors::{AuthUser, CurrentSession},
    middleware::AppState,
    response::ApiResponse,
};

/// List the caller's active sessions, flagging the current one.
async fn list(
    AuthUser(account): AuthUser,
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SessionView>>> {
    let sessions = state.session_service.list(&account.id, &session.id).await?;
    Ok(ApiResponse::ok(sessions))
}

/// Revoke one of the caller's other sessions. Revoking the session that
/// backs this request is a 400; use signout instead.
async fn revoke(
    AuthUser(account): AuthUser,
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state
        .session_service
        .revoke(&account.id, &session_id, &session.id)
        .await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{session_id}", delete(revoke))
}
