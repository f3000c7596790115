//! Payloads returned by the metrics backend, and the Datadog API response
//! shapes they are built from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Tool Payloads
// =============================================================================

/// Result of a timeseries query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPayload {
    pub query: String,
    /// Window start, unix seconds
    pub from: i64,
    /// Window end, unix seconds
    pub to: i64,
    pub series_count: usize,
    pub series: Vec<Series>,
}

impl TimeseriesPayload {
    pub fn new(query: impl Into<String>, from: i64, to: i64, series: Vec<Series>) -> Self {
        Self {
            query: query.into(),
            from,
            to,
            series_count: series.len(),
            series,
        }
    }
}

/// A single series, points are `[unix_seconds, value]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub scope: String,
    pub points: Vec<(i64, f64)>,
}

/// Tags of a metric grouped by key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTags {
    pub metric: String,
    pub tags: BTreeMap<String, Vec<String>>,
}

impl MetricTags {
    /// Group raw `key:value` tags. Tags without a value map to an empty list.
    pub fn from_raw(metric: impl Into<String>, raw_tags: &[String]) -> Self {
        let mut tags: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for tag in raw_tags {
            match tag.split_once(':') {
                Some((key, value)) => {
                    let values = tags.entry(key.to_string()).or_default();
                    if !values.iter().any(|v| v == value) {
                        values.push(value.to_string());
                    }
                }
                None => {
                    tags.entry(tag.clone()).or_default();
                }
            }
        }
        Self {
            metric: metric.into(),
            tags,
        }
    }
}

// =============================================================================
// Datadog API Response Types
// =============================================================================

/// `GET /api/v1/query`
#[derive(Clone, Debug, Deserialize)]
pub(super) struct DatadogQueryResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub series: Vec<DatadogSeries>,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct DatadogSeries {
    #[serde(default)]
    pub scope: Option<String>,
    /// `[[timestamp_ms, value], ...]`, value may be null
    #[serde(default)]
    pub pointlist: Vec<Vec<Option<f64>>>,
}

impl DatadogSeries {
    /// Convert to a [`Series`], or `None` when no usable point is left.
    pub fn into_series(self) -> Option<Series> {
        let points: Vec<(i64, f64)> = self
            .pointlist
            .iter()
            .filter_map(|point| {
                let timestamp_ms = point.first().copied().flatten()?;
                let value = point.get(1).copied().flatten().unwrap_or(0.0);
                Some(((timestamp_ms / 1000.0) as i64, value))
            })
            .collect();

        if points.is_empty() {
            return None;
        }

        Some(Series {
            scope: self.scope.unwrap_or_default(),
            points,
        })
    }
}

/// `GET /api/v1/search`
#[derive(Clone, Debug, Deserialize)]
pub(super) struct DatadogSearchResponse {
    #[serde(default)]
    pub results: DatadogSearchResults,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct DatadogSearchResults {
    #[serde(default)]
    pub metrics: Vec<String>,
}

/// `GET /api/v2/metrics/{metric_name}/all-tags`
#[derive(Clone, Debug, Deserialize)]
pub(super) struct DatadogAllTagsResponse {
    pub data: DatadogAllTagsData,
}

#[derive(Clone, Debug, Deserialize)]
pub(super) struct DatadogAllTagsData {
    #[serde(default)]
    pub attributes: DatadogAllTagsAttributes,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct DatadogAllTagsAttributes {
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Error body shared by Datadog endpoints.
#[derive(Clone, Debug, Default, Deserialize)]
pub(super) struct DatadogErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}
