use serde::Serialize;
use serde_json::Value;

use crate::dispatch::{FailureKind, ToolFailure};

/// One event of a streamed tool call, serialized as the SSE `data` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Start { tool: String, parameters: Value },
    Data { result: Value },
    Complete { status: String },
    Error { kind: FailureKind, message: String },
}

impl StreamEvent {
    pub fn start(tool: impl Into<String>, parameters: Value) -> Self {
        StreamEvent::Start {
            tool: tool.into(),
            parameters,
        }
    }

    pub fn data(result: Value) -> Self {
        StreamEvent::Data { result }
    }

    pub fn complete() -> Self {
        StreamEvent::Complete {
            status: "success".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::Data { .. } => "data",
            StreamEvent::Complete { .. } => "complete",
            StreamEvent::Error { .. } => "error",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl From<ToolFailure> for StreamEvent {
    fn from(failure: ToolFailure) -> Self {
        StreamEvent::Error {
            kind: failure.kind,
            message: failure.message,
        }
    }
}
