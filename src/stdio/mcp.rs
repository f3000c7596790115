//! MCP Message Handler
//!
//! Answers JSON-RPC messages arriving on stdio. Tool calls go through the
//! same dispatcher as the plain envelope protocol.

use serde_json::{Map, Value};
use tracing::debug;

use super::protocol::{
    methods, InitializeResult, McpError, McpRequest, McpResponse, McpToolDefinition, PingResult,
    ToolsCallParams, ToolsCallResult, ToolsListResult,
};
use crate::dispatch::{Dispatcher, ToolResult};

/// Per-connection MCP state.
#[derive(Debug, Default)]
pub struct McpSession {
    initialized: bool,
}

impl McpSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handle a single MCP message. Notifications get no response.
    pub async fn handle_message(
        &mut self,
        message: Value,
        dispatcher: &Dispatcher,
    ) -> Option<McpResponse> {
        let request: McpRequest = match serde_json::from_value(message) {
            Ok(req) => req,
            Err(e) => {
                return Some(McpResponse::error(
                    None,
                    McpError::ParseError(e.to_string()),
                ));
            }
        };

        let request_id = request.id.clone();

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::INITIALIZED | methods::SHUTDOWN => {
                debug!("Received {}", request.method);
                return None;
            }
            methods::PING => handle_ping(),
            methods::TOOLS_LIST => {
                if !self.initialized {
                    Err(McpError::InvalidRequest("Not initialized".to_string()))
                } else {
                    handle_tools_list(dispatcher)
                }
            }
            methods::TOOLS_CALL => {
                if !self.initialized {
                    Err(McpError::InvalidRequest("Not initialized".to_string()))
                } else {
                    handle_tools_call(&request, dispatcher).await
                }
            }
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        // Anything else without an id is a notification too
        if request_id.is_none() {
            return None;
        }

        Some(match result {
            Ok(value) => McpResponse::success(request_id, value),
            Err(error) => McpResponse::error(request_id, error),
        })
    }

    fn handle_initialize(&mut self) -> Result<Value, McpError> {
        self.initialized = true;

        let result = InitializeResult::new(format!(
            "{}-{}",
            env!("APP_VERSION"),
            env!("GIT_HASH")
        ));

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

fn handle_ping() -> Result<Value, McpError> {
    serde_json::to_value(PingResult {}).map_err(|e| McpError::InternalError(e.to_string()))
}

fn handle_tools_list(dispatcher: &Dispatcher) -> Result<Value, McpError> {
    let tools = dispatcher
        .list_tools()
        .into_iter()
        .map(McpToolDefinition::from)
        .collect();

    serde_json::to_value(ToolsListResult { tools })
        .map_err(|e| McpError::InternalError(e.to_string()))
}

async fn handle_tools_call(
    request: &McpRequest,
    dispatcher: &Dispatcher,
) -> Result<Value, McpError> {
    let params: ToolsCallParams = request
        .params
        .clone()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;

    let arguments = match params.arguments {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(arguments)) => arguments,
        Some(_) => {
            return Err(McpError::InvalidParams(
                "arguments must be an object".to_string(),
            ))
        }
    };

    let result = match dispatcher.dispatch(&params.name, &arguments).await {
        ToolResult::Success { payload } => ToolsCallResult::json(&payload)
            .map_err(|e| McpError::InternalError(e.to_string()))?,
        ToolResult::Failure(failure) if failure.kind.is_validation() => {
            return Err(McpError::ToolRejected(failure));
        }
        ToolResult::Failure(failure) => ToolsCallResult::error(failure.to_string()),
    };

    serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
}
