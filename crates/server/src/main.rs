//! Hostel complaint desk server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use hostel_api::{AppState, auth_middleware, router as api_router};
use hostel_common::Config;
use hostel_core::{
    AnalyticsService, ComplaintService, TokenService, UserService, triage::Triage,
};
use hostel_db::repositories::{ComplaintRepository, UserRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, shutting down");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_server=debug,hostel_api=debug,hostel_core=debug,hostel_db=debug,tower_http=debug".into()),
        )
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting hostel complaint desk"
    );

    let config = Config::load()?;

    let db = hostel_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    hostel_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let complaint_repo = ComplaintRepository::new(Arc::clone(&db));

    let triage = Triage::from_config(&config.triage)?;
    match config.triage.image_endpoint() {
        Some(endpoint) => info!(
            endpoint,
            timeout_ms = config.triage.timeout_ms,
            "Image triage enabled"
        ),
        None => info!("No triage endpoint configured, using text triage only"),
    }

    let user_service = UserService::new(user_repo.clone());
    if let Some(admin) = user_service.ensure_admin(&config.bootstrap).await? {
        info!(user_id = %admin.id, email = %admin.email, "Created bootstrap admin");
    }

    let state = AppState {
        user_service,
        complaint_service: ComplaintService::new(complaint_repo.clone(), user_repo, triage),
        analytics_service: AnalyticsService::new(complaint_repo),
        token_service: TokenService::new(&config.auth),
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
