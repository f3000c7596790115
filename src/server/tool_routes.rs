//! Synchronous tool endpoints.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::ServerState;
use crate::dispatch::{Dispatcher, FailureKind, ToolFailure, ToolResult};

const SERVICE_NAME: &str = "datadog-mcp-server";

#[derive(Serialize)]
struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: String,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Body of `POST /call` and `POST /call/stream`.
#[derive(Deserialize, Debug)]
pub(super) struct CallBody {
    pub tool: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

impl CallBody {
    pub(super) fn parse(bytes: &[u8]) -> Result<Self, ToolFailure> {
        serde_json::from_slice(bytes)
            .map_err(|e| ToolFailure::protocol_error(format!("Invalid request body: {}", e)))
    }
}

#[derive(Serialize)]
struct CallSuccess<'a> {
    status: &'static str,
    tool: &'a str,
    parameters: Value,
    result: Value,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a ToolFailure,
}

pub(super) fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::UnknownTool
        | FailureKind::MissingParameter
        | FailureKind::InvalidParameter
        | FailureKind::ProtocolError => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Unauthorized => StatusCode::UNAUTHORIZED,
        FailureKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        FailureKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Malformed => StatusCode::BAD_GATEWAY,
    }
}

pub(super) fn failure_response(failure: &ToolFailure) -> Response {
    (
        failure_status(failure.kind),
        Json(ErrorBody { error: failure }),
    )
        .into_response()
}

/// Query string values all arrive as JSON strings; coercion sorts them out.
pub(super) fn query_parameters(
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Result<Map<String, Value>, ToolFailure> {
    let Query(params) = query
        .map_err(|e| ToolFailure::protocol_error(format!("Invalid query string: {}", e)))?;
    Ok(params
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect())
}

async fn call_tool(dispatcher: &Dispatcher, tool: &str, raw: &Map<String, Value>) -> Response {
    let prepared = match dispatcher.prepare(tool, raw) {
        Ok(prepared) => prepared,
        Err(failure) => return failure_response(&failure),
    };

    match dispatcher.execute(&prepared).await {
        ToolResult::Success { payload } => Json(CallSuccess {
            status: "success",
            tool,
            parameters: prepared.parameters(),
            result: payload,
        })
        .into_response(),
        ToolResult::Failure(failure) => failure_response(&failure),
    }
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "healthy",
        service: SERVICE_NAME,
        version: format!("{}-{}", env!("APP_VERSION"), env!("GIT_HASH")),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn list_tools(State(dispatcher): State<Dispatcher>) -> impl IntoResponse {
    Json(serde_json::json!({ "tools": dispatcher.list_tools() }))
}

async fn get_tool(
    State(dispatcher): State<Dispatcher>,
    Path(tool): Path<String>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> Response {
    match query_parameters(query) {
        Ok(raw) => call_tool(&dispatcher, &tool, &raw).await,
        Err(failure) => failure_response(&failure),
    }
}

async fn post_call(State(dispatcher): State<Dispatcher>, body: Bytes) -> Response {
    match CallBody::parse(&body) {
        Ok(call) => {
            let raw = call.parameters.unwrap_or_default();
            call_tool(&dispatcher, &call.tool, &raw).await
        }
        Err(failure) => failure_response(&failure),
    }
}

pub fn make_tool_routes(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/call", post(post_call))
        .route("/{tool}", get(get_tool))
        .with_state(state)
}
