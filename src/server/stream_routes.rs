//! Streaming (SSE) tool endpoints.

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Router,
};
use futures::stream::{Stream, StreamExt};
use serde_json::{Map, Value};

use super::state::ServerState;
use super::tool_routes::{failure_response, query_parameters, CallBody};
use crate::dispatch::Dispatcher;
use crate::streaming::stream_tool_call;

fn tool_event_stream(
    dispatcher: Dispatcher,
    tool: String,
    raw: Map<String, Value>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream =
        stream_tool_call(dispatcher, tool, raw).map(|event| Ok(Event::default().data(event.to_json())));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

async fn stream_tool(
    State(dispatcher): State<Dispatcher>,
    Path(tool): Path<String>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    match query_parameters(query) {
        Ok(raw) => tool_event_stream(dispatcher, tool, raw).into_response(),
        Err(failure) => failure_response(&failure),
    }
}

async fn post_call_stream(State(dispatcher): State<Dispatcher>, body: Bytes) -> Response {
    match CallBody::parse(&body) {
        Ok(call) => {
            tool_event_stream(dispatcher, call.tool, call.parameters.unwrap_or_default())
                .into_response()
        }
        Err(failure) => failure_response(&failure),
    }
}

pub fn make_stream_routes(state: ServerState) -> Router {
    Router::new()
        .route("/call/stream", post(post_call_stream))
        .route("/{tool}/stream", get(stream_tool))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, MockMetricsBackend};
    use crate::server::ServerConfig;
    use crate::tools::ToolRegistry;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    fn app(backend: MockMetricsBackend) -> Router {
        let dispatcher = Dispatcher::new(
            Arc::new(ToolRegistry::builtin().unwrap()),
            Arc::new(backend),
        );
        make_stream_routes(ServerState::new(ServerConfig::default(), dispatcher))
    }

    /// Collect the JSON payloads of every `data:` line of an SSE body.
    async fn events(response: Response) -> Vec<Value> {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .filter_map(|line| line.strip_prefix("data: "))
            .map(|data| serde_json::from_str(data).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_stream_success() {
        let mut backend = MockMetricsBackend::new();
        backend
            .expect_search_names()
            .times(1)
            .returning(|_| Ok(vec!["system.cpu.user".to_string()]));

        let response = app(backend)
            .oneshot(
                Request::builder()
                    .uri("/search_metrics/stream?prefix=system")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );
        assert_eq!(
            events(response).await,
            vec![
                json!({"type": "start", "tool": "search_metrics", "parameters": {"prefix": "system"}}),
                json!({"type": "data", "result": ["system.cpu.user"]}),
                json!({"type": "complete", "status": "success"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_transient_failure_has_no_complete() {
        let mut backend = MockMetricsBackend::new();
        backend
            .expect_query_timeseries()
            .times(1)
            .returning(|_, _| Err(BackendError::Transient("Datadog returned 503".to_string())));

        let response = app(backend)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/call/stream")
                    .body(Body::from(
                        r#"{"tool": "query_metrics", "parameters": {"query": "avg:cpu{*}"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        let events = events(response).await;
        let types: Vec<_> = events.iter().map(|e| e["type"].clone()).collect();
        assert_eq!(types, vec![json!("start"), json!("error")]);
        assert_eq!(events[1]["kind"], "Transient");
    }

    #[tokio::test]
    async fn test_stream_bad_body_is_plain_400() {
        let response = app(MockMetricsBackend::new())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/call/stream")
                    .body(Body::from("nope"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["kind"], "ProtocolError");
    }
}
