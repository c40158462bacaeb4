//! HTTP API layer for minsu-connect.
//!
//! - **Endpoints**: REST API for posts, notifications, friends, sessions
//!   and moderation
//! - **Extractors**: Authentication and admin guards
//! - **Middleware**: Bearer-token session resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
