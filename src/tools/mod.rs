//! Tool Catalogue
//!
//! Definitions of the tools exposed to assistants, and the registry the
//! dispatcher resolves names against.

mod definition;
mod metrics;
mod registry;

pub use definition::{ParamKind, ParamSpec, ToolArguments, ToolDefinition};
pub use metrics::{
    GetMetricTagsParams, QueryMetricsParams, SearchMetricsParams, ToolCall, ToolKind,
    DEFAULT_DAYS_BACK,
};
pub use registry::{RegisteredTool, RegistryError, ToolRegistry};
