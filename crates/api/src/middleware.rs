//! API middleware.

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use minsu_core::{
    CommentService, FriendshipService, ModerationService, NotificationService, PostService,
    ReactionService, SessionService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub reaction_service: ReactionService,
    pub comment_service: CommentService,
    pub notification_service: NotificationService,
    pub moderation_service: ModerationService,
    pub friendship_service: FriendshipService,
    pub session_service: SessionService,
}

/// Authentication middleware.
///
/// Resolves a bearer token to its login session and account, stores both
/// in request extensions, and refreshes the activity stamps. Requests
/// without a valid token pass through unauthenticated; protected handlers
/// reject them via the extractors.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(session) = state.session_service.authenticate(token).await
        && let Ok(account) = state.user_service.get(&session.user_id).await
        && account.is_active()
    {
        if let Err(e) = state.session_service.touch(&session.id).await {
            tracing::debug!(error = %e, "failed to touch session");
        }
        if let Err(e) = state.user_service.touch_last_active(&account.id).await {
            tracing::debug!(error = %e, "failed to touch last_active_at");
        }

        req.extensions_mut().insert(account);
        req.extensions_mut().insert(session);
    }

    next.run(req).await
}
