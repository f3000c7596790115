//! Datadog MCP Server Library
//!
//! Exposes Datadog metric queries as tools over stdio (line-delimited JSON or
//! MCP) and HTTP (JSON and SSE). This library exposes the internal modules
//! for testing and reuse by the binary.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod server;
pub mod stdio;
pub mod streaming;
pub mod tools;

// Re-export commonly used types for convenience
pub use backend::{BackendError, DatadogClient, MetricsBackend};
pub use dispatch::{Dispatcher, FailureKind, ToolFailure, ToolResult};
pub use server::{run_server, RequestsLoggingLevel};
pub use stdio::run_stdio;
pub use tools::ToolRegistry;
