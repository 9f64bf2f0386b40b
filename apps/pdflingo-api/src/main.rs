//! PDFLingo API Server - Backend for layout-preserving PDF translation
//!
//! Provides REST endpoints for:
//! - Document upload and job submission
//! - Job status polling
//! - Cancellation
//! - Translated document download

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod handlers;
mod models;
mod state;
mod translator;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pdflingo_api=info".parse()?)
                .add_directive("pdflingo_jobs=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("Initializing PDFLingo API...");
    let state = Arc::new(AppState::new());

    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Translation job endpoints
        .route("/api/translations", post(handlers::create_translation))
        .route("/api/translations/:id", get(handlers::get_translation))
        .route(
            "/api/translations/:id/cancel",
            post(handlers::cancel_translation),
        )
        // Translated document delivery
        .route(
            "/api/translations/:id/document",
            get(handlers::get_document),
        )
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Parse bind address
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3002);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting PDFLingo API on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
