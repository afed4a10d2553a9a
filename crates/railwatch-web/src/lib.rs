//! Railwatch Web Server
//!
//! Axum-based server exposing the dashboard, the webhook ingress, and the
//! live feed.

pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use railwatch_core::Relay;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::dashboard::index))
        .route("/events", get(routes::feed::open_feed))
        .route("/webhook", post(routes::webhook::receive))
        .route("/api/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(relay: Arc<Relay>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(relay);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Relay listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}
