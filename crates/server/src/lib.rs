//! SyncHub Server Library
//!
//! Shared clipboard and file drop: authenticated REST writes fan out live
//! to every connected WebSocket client.

pub mod auth;
pub mod config;
pub mod ctx;
pub mod error;
pub mod handlers;
pub mod models;
pub mod realtime;
pub mod share;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::middleware::mw_require_auth;
use config::{AppState, ServerConfig};
use handlers::{
    create_clip, download_file, list_clips, list_files, login, upload_file, ws_subscribe,
};

/// Builds the full route tree over `state`.
///
/// Split out of [`run`] so tests can serve it from an ephemeral port.
pub fn app(state: AppState) -> Router {
    // Content routes sit behind the bearer-token middleware
    let protected = Router::new()
        .route("/api/clips", get(list_clips).post(create_clip))
        .route("/api/files", get(list_files).post(upload_file))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw_require_auth,
        ));

    Router::new()
        .merge(protected)
        // Login is the only unauthenticated API call
        .route("/api/login", post(login))
        // Downloads and the live channel are public by design
        .route("/uploads/{stored_name}", get(download_file))
        .route("/ws", get(ws_subscribe))
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    info!("=== SyncHub Server ===");
    info!("Features: Auth | Clips | File Drop | Live Broadcast");

    let config = ServerConfig::default();

    info!("Data directory: {:?}", config.data_dir);
    info!("Uploads directory: {:?}", config.upload_dir);

    let state = AppState::init(config.clone()).await?;
    info!("Managers initialized");

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("");
    info!("╔════════════════════════════════════════════════════════════╗");
    info!("║  SyncHub Server Running                                    ║");
    info!("║  Address: http://localhost:{:<5}                           ║", config.port);
    info!("╚════════════════════════════════════════════════════════════╝");
    info!("");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - SyncHub Server"
}
