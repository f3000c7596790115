//! HTTP client for the Datadog metrics API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{
    DatadogAllTagsResponse, DatadogErrorBody, DatadogQueryResponse, DatadogSearchResponse,
    MetricTags, TimeseriesPayload,
};
use super::{BackendError, BackendResult, MetricsBackend};

/// Search results are capped to keep tool output readable.
const MAX_SEARCH_RESULTS: usize = 50;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// HTTP client for communicating with the Datadog API.
pub struct DatadogClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    app_key: String,
}

impl DatadogClient {
    /// Create a new Datadog client.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.datadoghq.com")
    /// * `api_key` / `app_key` - Datadog credentials
    /// * `timeout_sec` - Request timeout in seconds, 0 leaves requests unbounded
    pub fn new(
        base_url: String,
        api_key: String,
        app_key: String,
        timeout_sec: u64,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if timeout_sec > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_sec));
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            api_key,
            app_key,
        })
    }

    /// API root for a Datadog site, e.g. "datadoghq.eu".
    pub fn site_url(site: &str) -> String {
        format!("https://api.{}", site.trim())
    }

    /// Get the base URL of the Datadog API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> BackendResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("DD-API-KEY", &self.api_key)
            .header("DD-APPLICATION-KEY", &self.app_key)
            .query(query)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_status(status, &body);
            warn!("Datadog request to {} failed: {}", path, err);
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            BackendError::Malformed(format!("Failed to parse Datadog response: {}", e))
        })
    }
}

#[async_trait]
impl MetricsBackend for DatadogClient {
    async fn query_timeseries(
        &self,
        query: &str,
        lookback_days: i64,
    ) -> BackendResult<TimeseriesPayload> {
        let (from, to) = query_window(chrono::Utc::now().timestamp(), lookback_days)?;

        let response: DatadogQueryResponse = self
            .get_json(
                "/api/v1/query",
                &[
                    ("from", from.to_string()),
                    ("to", to.to_string()),
                    ("query", query.to_string()),
                ],
            )
            .await?;

        if response.status.as_deref() == Some("error") {
            return Err(BackendError::Malformed(
                response
                    .error
                    .unwrap_or_else(|| "Datadog rejected the query".to_string()),
            ));
        }

        let series: Vec<_> = response
            .series
            .into_iter()
            .filter_map(|s| s.into_series())
            .collect();

        Ok(TimeseriesPayload::new(query, from, to, series))
    }

    async fn search_names(&self, prefix: &str) -> BackendResult<Vec<String>> {
        let response: DatadogSearchResponse = self
            .get_json("/api/v1/search", &[("q", format!("metrics:{}", prefix))])
            .await?;

        Ok(response
            .results
            .metrics
            .into_iter()
            .filter(|name| !name.is_empty())
            .take(MAX_SEARCH_RESULTS)
            .collect())
    }

    async fn get_tags(&self, metric_name: &str) -> BackendResult<MetricTags> {
        let path = format!(
            "/api/v2/metrics/{}/all-tags",
            urlencoding::encode(metric_name)
        );
        let response: DatadogAllTagsResponse = self.get_json(&path, &[]).await?;

        Ok(MetricTags::from_raw(metric_name, &response.data.attributes.tags))
    }
}

/// `[to - lookback_days, to]` in unix seconds.
fn query_window(to: i64, lookback_days: i64) -> BackendResult<(i64, i64)> {
    lookback_days
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|span| to.checked_sub(span))
        .map(|from| (from, to))
        .ok_or_else(|| {
            BackendError::Malformed(format!(
                "Lookback of {} days is out of range",
                lookback_days
            ))
        })
}

/// Failures before a status code was received.
fn classify_request_error(err: reqwest::Error) -> BackendError {
    if err.is_decode() {
        BackendError::Malformed(format!("Failed to decode Datadog response: {}", err))
    } else if err.is_timeout() {
        BackendError::Transient(format!("Datadog request timed out: {}", err))
    } else {
        BackendError::Transient(format!("Failed to reach Datadog: {}", err))
    }
}

/// Map a non-success status to a backend failure class.
fn classify_status(status: StatusCode, body: &str) -> BackendError {
    let details = serde_json::from_str::<DatadogErrorBody>(body)
        .map(|b| b.errors.join("; "))
        .unwrap_or_default();

    let message = if details.is_empty() {
        format!("Datadog returned {}", status)
    } else {
        format!("Datadog returned {}: {}", status, details)
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited(message),
        s if s.is_server_error() => BackendError::Transient(message),
        _ => BackendError::Malformed(message),
    }
}
