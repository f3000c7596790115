//! HTTP test client wrapping the tool API endpoints

use super::constants::*;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// HTTP test client
///
/// Methods return the raw `reqwest::Response` so tests can assert on status
/// codes before reading bodies.
pub struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    // ========================================================================
    // Discovery
    // ========================================================================

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET /tools
    pub async fn tools(&self) -> Response {
        self.client
            .get(format!("{}/tools", self.base_url))
            .send()
            .await
            .expect("Tools request failed")
    }

    // ========================================================================
    // Synchronous calls
    // ========================================================================

    /// GET /{tool}?k=v
    pub async fn call_get(&self, tool: &str, params: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/{}", self.base_url, tool))
            .query(params)
            .send()
            .await
            .expect("Tool GET request failed")
    }

    /// POST /call with a JSON body
    pub async fn call_post(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/call", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Tool POST request failed")
    }

    /// POST /call with a raw body, for malformed input
    pub async fn call_post_raw(&self, body: &'static str) -> Response {
        self.client
            .post(format!("{}/call", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Tool POST request failed")
    }

    // ========================================================================
    // Streaming calls
    // ========================================================================

    /// GET /{tool}/stream, returning the response for header checks
    pub async fn stream_get_response(&self, tool: &str, params: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/{}/stream", self.base_url, tool))
            .query(params)
            .send()
            .await
            .expect("Stream GET request failed")
    }

    /// GET /{tool}/stream and collect every event until the stream closes
    pub async fn stream_get(&self, tool: &str, params: &[(&str, &str)]) -> Vec<Value> {
        let response = self.stream_get_response(tool, params).await;
        parse_events(&response.text().await.expect("Failed to read stream"))
    }

    /// POST /call/stream and collect every event until the stream closes
    pub async fn stream_post(&self, body: &Value) -> Vec<Value> {
        let response = self
            .client
            .post(format!("{}/call/stream", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Stream POST request failed");
        parse_events(&response.text().await.expect("Failed to read stream"))
    }
}

/// Extract the JSON payload of every `data:` line of an SSE body.
pub fn parse_events(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).expect("Event is not JSON"))
        .collect()
}
