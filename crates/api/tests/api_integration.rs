//! API integration tests.
//!
//! These drive the router through the auth middleware against a mocked
//! database connection.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware as axum_middleware,
};
use minsu_api::{middleware::AppState, middleware::auth_middleware, router as api_router};
use minsu_core::{
    CommentService, FriendshipService, MediaService, ModerationService, NotificationService,
    PostService, ReactionService, SessionService, UserService,
};
use minsu_db::entities::{login_session, user};
use minsu_db::repositories::{
    CommentRepository, FriendshipRepository, ModerationLogRepository, NotificationRepository,
    PostRepository, ReactionRepository, ReportRepository, SessionRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use std::sync::Arc;
use tower::ServiceExt;

fn build_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let reaction_repo = ReactionRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let friendship_repo = FriendshipRepository::new(Arc::clone(&db));
    let log_repo = ModerationLogRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(notification_repo);
    let media_service = MediaService::new(900 * 1024);

    AppState {
        user_service: UserService::new(user_repo.clone()),
        post_service: PostService::new(
            post_repo.clone(),
            report_repo.clone(),
            media_service,
            notification_service.clone(),
        ),
        reaction_service: ReactionService::new(
            reaction_repo,
            post_repo.clone(),
            notification_service.clone(),
        ),
        comment_service: CommentService::new(
            comment_repo,
            post_repo.clone(),
            notification_service.clone(),
        ),
        notification_service: notification_service.clone(),
        moderation_service: ModerationService::new(
            post_repo,
            user_repo.clone(),
            report_repo,
            log_repo,
            session_repo.clone(),
            notification_service.clone(),
        ),
        friendship_service: FriendshipService::new(
            friendship_repo,
            user_repo,
            notification_service,
        ),
        session_service: SessionService::new(session_repo),
    }
}

fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_router())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_user() -> user::Model {
    user::Model {
        id: "01user0000000000000000000000".to_string(),
        email: "student@minsu.edu.ph".to_string(),
        email_lower: "student@minsu.edu.ph".to_string(),
        password_hash: "$argon2id$stub".to_string(),
        first_name: "Ana".to_string(),
        last_name: "Reyes".to_string(),
        department: None,
        campus: None,
        is_admin: false,
        is_banned: false,
        is_deactivated: false,
        is_deleted: false,
        ban_reason: None,
        banned_by: None,
        banned_at: None,
        deactivate_reason: None,
        deactivated_by: None,
        deactivated_at: None,
        created_at: chrono::Utc::now().into(),
        last_active_at: None,
        updated_at: None,
    }
}

fn test_session() -> login_session::Model {
    login_session::Model {
        id: "01sess0000000000000000000000".to_string(),
        user_id: "01user0000000000000000000000".to_string(),
        token: "aabbccddeeff00112233445566778899".to_string(),
        ip: Some("127.0.0.1".to_string()),
        user_agent: Some("curl/8.5.0".to_string()),
        device: Some("desktop".to_string()),
        browser: None,
        os: None,
        created_at: chrono::Utc::now().into(),
        last_seen_at: chrono::Utc::now().into(),
        revoked_at: None,
    }
}

#[tokio::test]
async fn unauthenticated_profile_request_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/i")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthenticated_post_submission_is_rejected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/posts")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"content":"hello"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_bearer_token_is_rejected() {
    // Session lookup by token returns nothing.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<login_session::Model>::new()])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/i")
                .header("Authorization", "Bearer bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoking_the_current_session_returns_400() {
    let session = test_session();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // Middleware: session by token, then user by id.
        .append_query_results([vec![session.clone()]])
        .append_query_results([vec![test_user()]])
        // Middleware: touch session and touch last_active_at.
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{}", session.id))
                .header("Authorization", format!("Bearer {}", session.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_reject_non_admin_users() {
    let session = test_session();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![session.clone()]])
        .append_query_results([vec![test_user()]])
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let app = build_app(build_state(db));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/posts")
                .header("Authorization", format!("Bearer {}", session.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
