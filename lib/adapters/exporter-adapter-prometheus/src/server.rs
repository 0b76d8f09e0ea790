use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::gauge::PrometheusTenantGauge;

pub fn router(gauge: Arc<PrometheusTenantGauge>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/healthz", get(health))
        .with_state(gauge)
}

async fn metrics(State(gauge): State<Arc<PrometheusTenantGauge>>) -> Response {
    match gauge.encode() {
        Ok(body) => ([(header::CONTENT_TYPE, gauge.content_type())], body).into_response(),
        Err(err) => {
            error!("Failed to render metrics: {:#}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}")).into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

pub async fn bind(listen_addr: &str) -> Result<TcpListener> {
    TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener on {listen_addr}"))
}

/// Serve `/metrics` until the listener fails.
pub async fn serve(listener: TcpListener, gauge: Arc<PrometheusTenantGauge>) -> Result<()> {
    let addr = listener
        .local_addr()
        .context("Failed to read metrics listener address")?;
    info!("Server listening on http://{}/metrics", addr);
    axum::serve(listener, router(gauge))
        .await
        .context("Metrics server stopped")
}
