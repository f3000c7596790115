//! Metrics Backend Adapter
//!
//! The dispatch core only talks to [`MetricsBackend`]. Each operation issues
//! exactly one outbound call and classifies its failure; retries and caching
//! are left to whoever sits above the dispatcher.

mod datadog;
mod models;

pub use datadog::DatadogClient;
pub use models::{MetricTags, Series, TimeseriesPayload};

use async_trait::async_trait;
use thiserror::Error;

/// Classified failure returned by a backend operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Malformed: {0}")]
    Malformed(String),
}

impl BackendError {
    /// The message without the classification prefix.
    pub fn message(&self) -> &str {
        match self {
            BackendError::Unauthorized(msg)
            | BackendError::NotFound(msg)
            | BackendError::RateLimited(msg)
            | BackendError::Transient(msg)
            | BackendError::Malformed(msg) => msg,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One operation per tool. Parameters arrive already validated and typed.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MetricsBackend: Send + Sync {
    /// Fetch the series matching `query` over the last `lookback_days` days.
    async fn query_timeseries(
        &self,
        query: &str,
        lookback_days: i64,
    ) -> BackendResult<TimeseriesPayload>;

    /// List metric names starting with `prefix`.
    async fn search_names(&self, prefix: &str) -> BackendResult<Vec<String>>;

    /// Get the tag mapping of a single metric.
    async fn get_tags(&self, metric_name: &str) -> BackendResult<MetricTags>;
}
