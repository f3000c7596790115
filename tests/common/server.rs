//! Test server lifecycle management
//!
//! Spawns the HTTP app on a random port, backed by a [`RecordingBackend`],
//! and shuts it down when dropped.

use super::backend::RecordingBackend;
use super::constants::*;
use datadog_mcp_server::server::{make_app, ServerConfig};
use datadog_mcp_server::{Dispatcher, RequestsLoggingLevel, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Dispatcher over the builtin tools and the given backend.
pub fn test_dispatcher(backend: Arc<RecordingBackend>) -> Dispatcher {
    let registry = ToolRegistry::builtin().expect("Builtin tools failed to register");
    Dispatcher::new(Arc::new(registry), backend)
}

/// Test server instance
///
/// The backend stays reachable through `backend` so tests can check which
/// calls reached it.
pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    pub port: u16,
    pub backend: Arc<RecordingBackend>,
    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawn a server over `backend` and wait until it answers.
    pub async fn spawn(backend: RecordingBackend) -> Self {
        let backend = Arc::new(backend);
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port: 0,
            bind_address: "127.0.0.1".to_string(),
        };
        let app = make_app(config, test_dispatcher(backend.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let port = listener
            .local_addr()
            .expect("Failed to read local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Test server failed");
        });

        wait_for_ready(&base_url).await;

        Self {
            base_url,
            port,
            backend,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn wait_for_ready(base_url: &str) {
    let client = reqwest::Client::new();
    let url = format!("{}/health", base_url);
    let deadline = tokio::time::Instant::now() + Duration::from_millis(SERVER_READY_TIMEOUT_MS);

    while tokio::time::Instant::now() < deadline {
        if let Ok(response) = client.get(&url).send().await {
            if response.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
    }

    panic!(
        "Test server at {} not ready within {}ms",
        base_url, SERVER_READY_TIMEOUT_MS
    );
}
