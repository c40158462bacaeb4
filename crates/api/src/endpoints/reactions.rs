//! Reaction endpoints, nested under `/posts`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::put,
};
use minsu_common::AppResult;
use minsu_db::entities::reaction;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Reaction request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionRequest {
    pub kind: String,
}

/// Set the caller's reaction on a post.
async fn set_reaction(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Json(req): Json<ReactionRequest>,
) -> AppResult<ApiResponse<reaction::Model>> {
    let reacted = state
        .reaction_service
        .set(&account.id, &post_id, &req.kind)
        .await?;
    Ok(ApiResponse::ok(reacted))
}

/// Remove the caller's reaction.
async fn remove_reaction(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<serde_json::Value>> {
    state.reaction_service.remove(&account.id, &post_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({ "ok": true })))
}

/// List reactions on a post.
async fn list_reactions(
    AuthUser(_account): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<reaction::Model>>> {
    let reactions = state.reaction_service.list(&post_id).await?;
    Ok(ApiResponse::ok(reactions))
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{post_id}/reactions",
        put(set_reaction).delete(remove_reaction).get(list_reactions),
    )
}
