//! Server module for AgroCam
//!
//! Loads configuration, wires the coordinator and serves the HTTP API.

pub mod config;
pub mod init;
pub mod loader;
pub mod validation;

pub use config::AppConfig;
pub use init::{api_key, build_orchestrator, build_runner};
pub use loader::load_config;

use crate::api::{api_router, docs_routes, health_routes, AppState};
use agrocam_core::Orchestrator;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Start the HTTP server
pub async fn run() -> Result<()> {
    let config = load_config()?;
    validation::validate_production_config(&config);

    let runner = build_runner(&config.agriculture);
    let orchestrator = match build_orchestrator(&config, runner.clone()) {
        Ok(orchestrator) => Some(Arc::new(orchestrator)),
        Err(e) => {
            warn!("Coordinator disabled, advisory endpoint will answer 503: {}", e);
            None
        }
    };

    let cleanup = orchestrator.clone().map(spawn_cleanup);

    let state = AppState {
        orchestrator,
        runner,
    };

    let app = Router::new()
        .route("/", axum::routing::get(|| async { "AgroCam" }))
        .merge(health_routes(state.clone()))
        .merge(api_router(state))
        .merge(docs_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins));

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);
    info!("API documentation at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(handle) = cleanup {
        handle.abort();
    }
    info!("AgroCam shutdown complete");
    Ok(())
}

fn spawn_cleanup(orchestrator: Arc<Orchestrator>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;
            match orchestrator.cleanup().await {
                Ok(0) => {}
                Ok(removed) => info!("Cleanup: dropped {} expired sessions and answers", removed),
                Err(e) => warn!("Cleanup failed: {}", e),
            }
        }
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
