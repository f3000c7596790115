//! Line-level framing of the stdio transport.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::dispatch::{ToolFailure, ToolResult};

/// `{id?, tool, parameters?}`. The id is opaque and echoed back verbatim,
/// `null` included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolRequest {
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub tool: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

/// A present `id` key, even `null`, becomes `Some`. Only a missing key is `None`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseBody {
    Result(Value),
    Error(ToolFailure),
}

/// `{id, result}` or `{id, error: {kind, message}}`; `id` is left out when
/// the request had none.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl ToolResponse {
    pub fn from_result(id: Option<Value>, result: ToolResult) -> Self {
        let body = match result {
            ToolResult::Success { payload } => ResponseBody::Result(payload),
            ToolResult::Failure(failure) => ResponseBody::Error(failure),
        };
        Self { id, body }
    }

    pub fn failure(id: Option<Value>, failure: ToolFailure) -> Self {
        Self {
            id,
            body: ResponseBody::Error(failure),
        }
    }
}

/// What a single input line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Tool(ToolRequest),
    /// A JSON-RPC message, recognised by its `jsonrpc` key
    Mcp(Value),
    /// Malformed envelope answered directly
    Reply(ToolResponse),
    /// Blank or unanswerable line
    Skip,
}

pub fn parse_line(line: &[u8]) -> Incoming {
    let (text, valid_utf8) = match std::str::from_utf8(line) {
        Ok(text) => (std::borrow::Cow::Borrowed(text), true),
        Err(_) => (String::from_utf8_lossy(line), false),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Incoming::Skip;
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            warn!("Dropping unparsable line: {}", e);
            return Incoming::Skip;
        }
    };

    let object = match value {
        Value::Object(object) => object,
        _ => {
            warn!("Dropping line that is not a JSON object");
            return Incoming::Skip;
        }
    };

    if object.contains_key("jsonrpc") {
        return Incoming::Mcp(Value::Object(object));
    }

    let id = object.get("id").cloned();

    let failure = if !valid_utf8 {
        ToolFailure::protocol_error("Request is not valid UTF-8")
    } else {
        match serde_json::from_value::<ToolRequest>(Value::Object(object)) {
            Ok(request) => return Incoming::Tool(request),
            Err(e) => ToolFailure::protocol_error(format!("Malformed request: {}", e)),
        }
    };

    match id {
        Some(id) => Incoming::Reply(ToolResponse::failure(Some(id), failure)),
        None => {
            warn!("Dropping request without id: {}", failure.message);
            Incoming::Skip
        }
    }
}
