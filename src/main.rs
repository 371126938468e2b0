// Main entry point - Dependency injection and server setup
use anyhow::Context;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use vehicle_sessions::application::session_service::SessionSummaryService;
use vehicle_sessions::infrastructure::config::load_app_config;
use vehicle_sessions::infrastructure::influx_repository::InfluxRepository;
use vehicle_sessions::presentation::app_state::AppState;
use vehicle_sessions::presentation::handlers::{health_check, session_summary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load configuration")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        config.influx.host,
        config.influx.token,
        config.influx.database,
        config.influx.retention_policy,
    ));

    // Create services (application layer)
    let session_service = SessionSummaryService::new(repository);

    // Create application state
    let state = Arc::new(AppState { session_service });

    // Build router (presentation layer)
    // Compression is negotiated in the response builders, not with a layer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/sessions/:session_type/:id", get(session_summary))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_address))?;
    tracing::info!("Starting vehicle-sessions service on {}", config.server.bind_address);

    axum::serve(listener, router).await?;

    Ok(())
}
