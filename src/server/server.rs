use anyhow::{Context, Result};
use std::future::Future;

use axum::{middleware, routing::get, Router};
use tracing::info;

use super::{
    log_requests, make_stream_routes, make_tool_routes, metrics::metrics_handler,
    state::ServerState, ServerConfig,
};
use crate::dispatch::Dispatcher;

pub fn make_app(config: ServerConfig, dispatcher: Dispatcher) -> Router {
    let state = ServerState::new(config, dispatcher);

    Router::new()
        .merge(make_tool_routes(state.clone()))
        .merge(make_stream_routes(state.clone()))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serve the tool API until `shutdown` resolves.
pub async fn run_server<F>(config: ServerConfig, dispatcher: Dispatcher, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, dispatcher);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Ready to serve at {}!", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

/// Serve Prometheus metrics on their own port.
pub async fn run_metrics_server(bind_address: String, port: u16) -> Result<()> {
    let address = format!("{}:{}", bind_address, port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind metrics server to {}", address))?;
    info!("Metrics available at {}!", address);

    axum::serve(listener, make_metrics_app())
        .await
        .context("Metrics server failed")
}
