//! Tool Dispatch
//!
//! Resolves a tool name against the registry, validates and coerces the
//! caller's parameters, then issues exactly one backend call. Every transport
//! goes through [`Dispatcher`], so the same request yields the same result
//! regardless of how it arrived.

mod failure;
mod validate;

pub use failure::{FailureKind, ToolFailure, ToolResult};

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::backend::MetricsBackend;
use crate::server::metrics::{record_rejected_call, record_tool_call};
use crate::tools::{ToolArguments, ToolCall, ToolDefinition, ToolRegistry};

/// Metric label for names that are not in the registry.
const UNKNOWN_TOOL_LABEL: &str = "unknown";

/// A call that passed validation and is ready for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub tool: String,
    pub arguments: ToolArguments,
    call: ToolCall,
}

impl PreparedCall {
    /// Coerced parameters, defaults included.
    pub fn parameters(&self) -> Value {
        self.arguments.to_value()
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    backend: Arc<dyn MetricsBackend>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, backend: Arc<dyn MetricsBackend>) -> Self {
        Self { registry, backend }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        self.registry.list()
    }

    /// Validate `raw` against the named tool. Never touches the backend, so
    /// calling it repeatedly with the same input gives the same answer.
    /// Rejections are counted in the tool call metrics.
    pub fn prepare(
        &self,
        tool: &str,
        raw: &Map<String, Value>,
    ) -> Result<PreparedCall, ToolFailure> {
        self.validate(tool, raw).map_err(|failure| {
            let label = match self.registry.lookup(tool) {
                Some(registered) => registered.name(),
                None => UNKNOWN_TOOL_LABEL,
            };
            record_rejected_call(label, failure.kind.as_str());
            failure
        })
    }

    fn validate(
        &self,
        tool: &str,
        raw: &Map<String, Value>,
    ) -> Result<PreparedCall, ToolFailure> {
        let registered = self
            .registry
            .lookup(tool)
            .ok_or_else(|| ToolFailure::unknown_tool(tool))?;

        let arguments = validate::coerce_arguments(&registered.definition, raw)?;
        let call = registered
            .kind
            .bind(&arguments)
            .map_err(|e| ToolFailure::invalid_parameter(e.to_string()))?;

        Ok(PreparedCall {
            tool: tool.to_string(),
            arguments,
            call,
        })
    }

    /// Issue the backend call for a prepared call.
    pub async fn execute(&self, prepared: &PreparedCall) -> ToolResult {
        let start = Instant::now();
        let result = match prepared.call.invoke(self.backend.as_ref()).await {
            Ok(payload) => ToolResult::Success { payload },
            Err(err) => {
                warn!("Tool {} failed: {}", prepared.tool, err);
                ToolResult::Failure(err.into())
            }
        };
        let elapsed = start.elapsed();

        debug!(
            "Tool {} finished in {:?} with outcome {}",
            prepared.tool,
            elapsed,
            result.outcome()
        );
        record_tool_call(&prepared.tool, result.outcome(), elapsed);
        result
    }

    /// Validate, then execute. Validation failures never reach the backend.
    pub async fn dispatch(&self, tool: &str, raw: &Map<String, Value>) -> ToolResult {
        match self.prepare(tool, raw) {
            Ok(prepared) => self.execute(&prepared).await,
            Err(failure) => {
                debug!("Rejected call to {}: {}", tool, failure);
                ToolResult::Failure(failure)
            }
        }
    }
}
