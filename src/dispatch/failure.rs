//! Tool call outcomes.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::backend::BackendError;

/// Every way a tool call can fail, across transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FailureKind {
    // Validation, raised before any backend call
    UnknownTool,
    MissingParameter,
    InvalidParameter,

    // Transport framing, never reaches the dispatcher
    ProtocolError,

    // Backend
    Unauthorized,
    NotFound,
    RateLimited,
    Transient,
    Malformed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnknownTool => "UnknownTool",
            FailureKind::MissingParameter => "MissingParameter",
            FailureKind::InvalidParameter => "InvalidParameter",
            FailureKind::ProtocolError => "ProtocolError",
            FailureKind::Unauthorized => "Unauthorized",
            FailureKind::NotFound => "NotFound",
            FailureKind::RateLimited => "RateLimited",
            FailureKind::Transient => "Transient",
            FailureKind::Malformed => "Malformed",
        }
    }

    /// True for failures detected before the backend was called.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FailureKind::UnknownTool | FailureKind::MissingParameter | FailureKind::InvalidParameter
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed tool call, as rendered to clients: `{kind, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: &str) -> Self {
        Self::new(FailureKind::UnknownTool, format!("Unknown tool: {}", name))
    }

    /// The message is the bare parameter name.
    pub fn missing_parameter(name: &str) -> Self {
        Self::new(FailureKind::MissingParameter, name)
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidParameter, message)
    }

    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::new(FailureKind::ProtocolError, message)
    }
}

impl From<BackendError> for ToolFailure {
    fn from(err: BackendError) -> Self {
        let kind = match &err {
            BackendError::Unauthorized(_) => FailureKind::Unauthorized,
            BackendError::NotFound(_) => FailureKind::NotFound,
            BackendError::RateLimited(_) => FailureKind::RateLimited,
            BackendError::Transient(_) => FailureKind::Transient,
            BackendError::Malformed(_) => FailureKind::Malformed,
        };
        Self::new(kind, err.message())
    }
}

/// Outcome of a dispatched call. Exactly one variant is populated.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success { payload: Value },
    Failure(ToolFailure),
}

impl ToolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ToolResult::Success { .. } => None,
            ToolResult::Failure(failure) => Some(failure.kind),
        }
    }

    /// Label used in metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ToolResult::Success { .. } => "success",
            ToolResult::Failure(failure) => failure.kind.as_str(),
        }
    }
}

impl From<ToolFailure> for ToolResult {
    fn from(failure: ToolFailure) -> Self {
        ToolResult::Failure(failure)
    }
}
