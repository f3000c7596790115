//! Metrics Tools
//!
//! The fixed tool catalogue: timeseries query, metric search and tag lookup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::definition::{ParamSpec, ToolArguments, ToolDefinition};
use crate::backend::{BackendError, BackendResult, MetricsBackend};

/// Lookback window used when `days_back` is omitted.
pub const DEFAULT_DAYS_BACK: i64 = 7;

/// Longest lookback window accepted, ten years.
pub const MAX_DAYS_BACK: i64 = 3650;

/// The closed set of tools this server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    QueryMetrics,
    SearchMetrics,
    GetMetricTags,
}

impl ToolKind {
    /// Every tool, in listing order.
    pub const ALL: [ToolKind; 3] = [
        ToolKind::QueryMetrics,
        ToolKind::SearchMetrics,
        ToolKind::GetMetricTags,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::QueryMetrics => "query_metrics",
            ToolKind::SearchMetrics => "search_metrics",
            ToolKind::GetMetricTags => "get_metric_tags",
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        match self {
            ToolKind::QueryMetrics => {
                ToolDefinition::new(self.name(), "Query Datadog metrics with time-series data")
                    .param(ParamSpec::string("query").description(
                        "Datadog metric query (e.g., 'avg:system.cpu.user{*}')",
                    ))
                    .param(
                        ParamSpec::integer("days_back")
                            .description("Number of days to look back (default: 7)")
                            .optional(DEFAULT_DAYS_BACK)
                            .minimum(1)
                            .maximum(MAX_DAYS_BACK),
                    )
            }
            ToolKind::SearchMetrics => {
                ToolDefinition::new(self.name(), "Search for available metrics by prefix").param(
                    ParamSpec::string("prefix")
                        .description("Metric prefix to search (e.g., 'system.cpu')"),
                )
            }
            ToolKind::GetMetricTags => {
                ToolDefinition::new(self.name(), "Get tag information for a metric").param(
                    ParamSpec::string("metric_name")
                        .description("Full metric name (e.g., 'system.cpu.user')"),
                )
            }
        }
    }

    /// Bind validated arguments to the typed call for this tool.
    pub fn bind(&self, arguments: &ToolArguments) -> Result<ToolCall, serde_json::Error> {
        let value = arguments.to_value();
        Ok(match self {
            ToolKind::QueryMetrics => ToolCall::QueryMetrics(serde_json::from_value(value)?),
            ToolKind::SearchMetrics => ToolCall::SearchMetrics(serde_json::from_value(value)?),
            ToolKind::GetMetricTags => ToolCall::GetMetricTags(serde_json::from_value(value)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryMetricsParams {
    pub query: String,
    pub days_back: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchMetricsParams {
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetMetricTagsParams {
    pub metric_name: String,
}

/// A fully typed tool call, ready to hit the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    QueryMetrics(QueryMetricsParams),
    SearchMetrics(SearchMetricsParams),
    GetMetricTags(GetMetricTagsParams),
}

impl ToolCall {
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolCall::QueryMetrics(_) => ToolKind::QueryMetrics,
            ToolCall::SearchMetrics(_) => ToolKind::SearchMetrics,
            ToolCall::GetMetricTags(_) => ToolKind::GetMetricTags,
        }
    }

    /// Issue the single backend call for this tool.
    pub async fn invoke(&self, backend: &dyn MetricsBackend) -> BackendResult<Value> {
        match self {
            ToolCall::QueryMetrics(params) => {
                to_payload(backend.query_timeseries(&params.query, params.days_back).await?)
            }
            ToolCall::SearchMetrics(params) => {
                to_payload(backend.search_names(&params.prefix).await?)
            }
            ToolCall::GetMetricTags(params) => {
                to_payload(backend.get_tags(&params.metric_name).await?)
            }
        }
    }
}

fn to_payload<T: Serialize>(payload: T) -> BackendResult<Value> {
    serde_json::to_value(payload)
        .map_err(|e| BackendError::Malformed(format!("Unserializable payload: {}", e)))
}
