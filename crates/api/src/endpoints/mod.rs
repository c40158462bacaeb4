//! API endpoints.

mod account;
mod admin;
mod auth;
mod comments;
mod friends;
mod notifications;
mod posts;
mod reactions;
mod sessions;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .nest("/i", account::router())
        .nest(
            "/posts",
            posts::router()
                .merge(reactions::router())
                .merge(comments::router()),
        )
        .nest("/notifications", notifications::router())
        .nest("/friends", friends::router())
        .nest("/sessions", sessions::router())
        .nest("/admin", admin::router())
}
