//! HTTP surface of the service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{FromRef, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use log::info;
use sqlx::SqlitePool;

use crate::classifier::SentimentAnalyzer;

pub mod error;
pub mod extract;
pub mod handlers;
pub mod schemas;

pub use error::ApiError;
pub use schemas::{FieldError, HealthResponse, HistoryEntry, LocItem, SentimentRequest, SentimentResponse};

/// Dependencies shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// `None` when the artifacts failed to load (degraded mode)
    pub analyzer: Option<Arc<SentimentAnalyzer>>,
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(analyzer: Option<Arc<SentimentAnalyzer>>, pool: SqlitePool) -> Self {
        Self { analyzer, pool }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.analyzer.is_some()
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Build the axum router for the public API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health_check))
        .route("/analisar-sentimento", post(handlers::analyze_sentiment))
        .route("/historico", get(handlers::recent_history))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    info!("{} {} -> {} ({:.2?})", method, path, response.status().as_u16(), start.elapsed());
    response
}

/// Serve the API until Ctrl-C is received.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
