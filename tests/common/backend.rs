//! Stub metrics backend that records every call it receives.

use super::constants::*;
use async_trait::async_trait;
use datadog_mcp_server::backend::{
    BackendError, BackendResult, MetricTags, MetricsBackend, Series, TimeseriesPayload,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers with canned data, or with a fixed error when built with
/// [`RecordingBackend::failing`]. Counters can be read after the backend has
/// been handed to a dispatcher.
#[derive(Default)]
pub struct RecordingBackend {
    failure: Option<BackendError>,
    query_calls: AtomicUsize,
    search_calls: AtomicUsize,
    tags_calls: AtomicUsize,
    last_lookback_days: Mutex<Option<i64>>,
    last_prefix: Mutex<Option<String>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation fails with `error`.
    pub fn failing(error: BackendError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn tags_calls(&self) -> usize {
        self.tags_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.query_calls() + self.search_calls() + self.tags_calls()
    }

    pub fn last_lookback_days(&self) -> Option<i64> {
        *self.last_lookback_days.lock().unwrap()
    }

    pub fn last_prefix(&self) -> Option<String> {
        self.last_prefix.lock().unwrap().clone()
    }

    fn check(&self) -> BackendResult<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetricsBackend for RecordingBackend {
    async fn query_timeseries(
        &self,
        query: &str,
        lookback_days: i64,
    ) -> BackendResult<TimeseriesPayload> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_lookback_days.lock().unwrap() = Some(lookback_days);
        self.check()?;

        let to = 1_700_000_000;
        let from = to - lookback_days * 86_400;
        Ok(TimeseriesPayload::new(
            query,
            from,
            to,
            vec![Series {
                scope: "host:web-1".to_string(),
                points: vec![(from, 1.5), (to, 2.5)],
            }],
        ))
    }

    async fn search_names(&self, prefix: &str) -> BackendResult<Vec<String>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prefix.lock().unwrap() = Some(prefix.to_string());
        self.check()?;

        Ok(SEARCH_RESULTS.iter().map(|s| s.to_string()).collect())
    }

    async fn get_tags(&self, metric_name: &str) -> BackendResult<MetricTags> {
        self.tags_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        Ok(MetricTags::from_raw(
            metric_name,
            &["host:web-1".to_string(), "env:prod".to_string()],
        ))
    }
}
