//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use minsu_common::AppResult;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, CurrentSession},
    middleware::AppState,
    response::ApiResponse,
};

/// Signup response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Create a new account and log it in.
async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<minsu_core::RegisterInput>,
) -> AppResult<ApiResponse<SignupResponse>> {
    let account = state.user_service.register(req).await?;
    let session = state
        .session_service
        .record_login(&account.id, client_ip(&headers), user_agent(&headers))
        .await?;

    Ok(ApiResponse::ok(SignupResponse {
        id: account.id,
        email: account.email,
        token: session.token,
    }))
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Signin response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub id: String,
    pub email: String,
    pub token: String,
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SigninResponse>> {
    let account = state
        .user_service
        .verify_credentials(&req.email, &req.password)
        .await?;

    let session = state
        .session_service
        .record_login(&account.id, client_ip(&headers), user_agent(&headers))
        .await?;

    Ok(ApiResponse::ok(SigninResponse {
        id: account.id,
        email: account.email,
        token: session.token,
    }))
}

/// Signout response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out: revoke the session backing this request.
async fn signout(
    CurrentSession(session): CurrentSession,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.session_service.logout(&session.id).await?;
    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

/// Sign out everywhere: revoke every session of the account.
async fn signout_everywhere(
    AuthUser(account): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.session_service.logout_everywhere(&account.id).await?;
    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

fn client_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers.get("user-agent").and_then(|v| v.to_str().ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/signout-everywhere", post(signout_everywhere))
}
