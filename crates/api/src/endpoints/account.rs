//! Current-account endpoints.

use axum::{Json, Router, extract::State, routing::get};
use minsu_common::AppResult;
use minsu_db::entities::user;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Get the current account's profile.
async fn me(AuthUser(account): AuthUser) -> ApiResponse<user::Model> {
    ApiResponse::ok(account)
}

/// Update profile fields.
async fn update_profile(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<minsu_core::UpdateProfileInput>,
) -> AppResult<ApiResponse<user::Model>> {
    let updated = state.user_service.update_profile(&account.id, req).await?;
    Ok(ApiResponse::ok(updated))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(me).patch(update_profile))
}
