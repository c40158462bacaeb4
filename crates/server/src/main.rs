//! minsu-connect server entry point.

#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::{Router, middleware};
use minsu_api::{middleware::AppState, router as api_router};
use minsu_common::Config;
use minsu_core::{
    CommentService, FriendshipService, MediaService, ModerationService, NotificationService,
    PostService, ReactionService, SessionService, UserService,
};
use minsu_db::repositories::{
    CommentRepository, FriendshipRepository, ModerationLogRepository, NotificationRepository,
    PostRepository, ReactionRepository, ReportRepository, SessionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minsu=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting minsu-connect server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = minsu_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    minsu_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
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

    // Initialize services
    let notification_service = NotificationService::new(notification_repo);
    let media_service = MediaService::new(config.media.max_media_bytes);

    let state = AppState {
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
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            minsu_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
