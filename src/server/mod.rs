//! HTTP surface: `GET /api/scan` and `GET /api/status`.

pub mod error;
pub mod handlers;
pub mod middleware;

use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServerConfig;
use crate::core::catalog::{CatalogStore, FileCatalogSource};
use crate::core::service::ScanService;
use crate::utils::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<ScanService>,
    pub started_at: Instant,
    pub port: u16,
}

impl AppState {
    pub fn new(scanner: Arc<ScanService>, port: u16) -> Self {
        Self {
            scanner,
            started_at: Instant::now(),
            port,
        }
    }
}

/// Loads the catalog once and assembles the scan service from `config`.
pub async fn build_scan_service(config: &ServerConfig) -> Result<ScanService> {
    let source = FileCatalogSource::new(&config.catalog.path);
    let store = CatalogStore::load(&source, config.jitter.policy).await;
    ScanService::new(
        Arc::new(store),
        config.jitterer()?,
        config.scan.stages.clone(),
    )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/scan", get(handlers::scan))
        .route("/api/status", get(handlers::status))
        .fallback(handlers::not_found)
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve(listener: TcpListener, scanner: Arc<ScanService>) -> Result<()> {
    let port = listener.local_addr()?.port();
    let app = build_router(AppState::new(scanner, port));
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds the configured address and serves until the process exits.
pub async fn run(config: &ServerConfig) -> Result<()> {
    let scanner = Arc::new(build_scan_service(config).await?);
    let listener = TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;

    tracing::info!("🤖 Price robot started");
    tracing::info!("📡 Server: http://{}", addr);
    tracing::info!(
        "⚙️ Jitter band [{}, {}], policy {:?}, simulated latency {}ms",
        config.jitter.low,
        config.jitter.high,
        config.jitter.policy,
        config.total_scan_delay_ms()
    );

    serve(listener, scanner).await
}
