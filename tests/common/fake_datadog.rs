//! Stand-in for the Datadog HTTP API
//!
//! Every request gets the same canned response. The last request's path,
//! query and credential headers are kept for assertions.

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use datadog_mcp_server::DatadogClient;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::constants::*;

#[derive(Clone, Debug)]
pub struct FakeResponse {
    pub status: StatusCode,
    pub body: String,
}

impl FakeResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
        }
    }

    pub fn status(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SeenRequest {
    pub path: String,
    pub query: String,
    pub api_key: Option<String>,
    pub app_key: Option<String>,
}

#[derive(Clone)]
struct FakeState {
    response: FakeResponse,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct FakeDatadog {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    _shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FakeDatadog {
    pub async fn spawn(response: FakeResponse) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            response,
            seen: seen.clone(),
        };
        let app = Router::new().fallback(answer).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Datadog");
        let base_url = format!(
            "http://127.0.0.1:{}",
            listener.local_addr().expect("No local address").port()
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Fake Datadog failed");
        });

        Self {
            base_url,
            seen,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// A client pointed at this server with the test credentials.
    pub fn client(&self) -> DatadogClient {
        DatadogClient::new(
            self.base_url.clone(),
            TEST_API_KEY.to_string(),
            TEST_APP_KEY.to_string(),
            REQUEST_TIMEOUT_SECS,
        )
        .expect("Failed to build Datadog client")
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for FakeDatadog {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn answer(State(state): State<FakeState>, request: Request) -> impl IntoResponse {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let seen = SeenRequest {
        path: request.uri().path().to_string(),
        query: request.uri().query().unwrap_or_default().to_string(),
        api_key: header("DD-API-KEY"),
        app_key: header("DD-APPLICATION-KEY"),
    };
    state.seen.lock().unwrap().push(seen);

    Response::builder()
        .status(state.response.status)
        .header("content-type", "application/json")
        .body(Body::from(state.response.body.clone()))
        .unwrap()
}
