//! Prometheus query client

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, error};

#[cfg(test)]
use mockall::automock;

use crate::config::{HTTP_TIMEOUT, PrometheusConfig};
use crate::prometheus::auth::Credentials;
use crate::prometheus::error::MetricsError;

/// Time range of a query, in unix seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: i64,
    pub end: i64,
    pub step: i64,
}

/// One labelled series of a matrix result
#[derive(Debug, Clone, PartialEq)]
pub struct SampleStream {
    pub labels: BTreeMap<String, String>,
    pub values: Vec<(f64, f64)>,
}

/// One labelled value of a vector result
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: BTreeMap<String, String>,
    pub value: f64,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetricsClient: Send + Sync {
    /// Runs a PromQL range query and returns its matrix result
    async fn query_range(
        &self,
        query: &str,
        range: &QueryRange,
    ) -> Result<Vec<SampleStream>, MetricsError>;

    /// Runs a PromQL instant query at `time` (unix seconds)
    async fn query(&self, query: &str, time: i64) -> Result<Vec<Sample>, MetricsError>;
}

pub struct PrometheusClient {
    client: Client,
    config: PrometheusConfig,
    token_path: PathBuf,
}

impl PrometheusClient {
    pub fn new(config: PrometheusConfig, token_path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            config,
            token_path,
        }
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        result_type: &str,
    ) -> Result<Vec<RawSeries>, MetricsError> {
        let credentials = Credentials::resolve(&self.config.auth, &self.token_path)
            .inspect_err(|e| error!("Could not read the service account token: {}", e))?;

        let base = format!("{}/api/v1/{}", self.config.url.trim_end_matches('/'), endpoint);
        let url = Url::parse_with_params(&base, params)
            .map_err(|e| MetricsError::Url(e.to_string()))?;

        let request = self.client.get(url).timeout(HTTP_TIMEOUT);
        let response = credentials.apply(request).send().await?;
        let status = response.status();

        // Prometheus reports query errors with a JSON body on 4xx/5xx
        let body: ApiResponse = response.json().await.map_err(|e| {
            MetricsError::InvalidResponse(format!("status {}: {}", status.as_u16(), e))
        })?;

        if body.status != "success" {
            return Err(MetricsError::Query {
                error_type: body.error_type.unwrap_or_default(),
                message: body.error.unwrap_or_default(),
            });
        }

        let data = body
            .data
            .ok_or_else(|| MetricsError::InvalidResponse("missing data".to_string()))?;
        if data.result_type != result_type {
            return Err(MetricsError::InvalidResponse(format!(
                "unexpected result type {}",
                data.result_type
            )));
        }
        Ok(data.result)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    status: String,
    data: Option<QueryData>,
    error_type: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    result_type: String,
    result: Vec<RawSeries>,
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
    value: Option<(f64, String)>,
}

#[async_trait]
impl MetricsClient for PrometheusClient {
    async fn query_range(
        &self,
        query: &str,
        range: &QueryRange,
    ) -> Result<Vec<SampleStream>, MetricsError> {
        debug!("Prometheus range query: {}", query);
        let params = [
            ("query", query.to_string()),
            ("start", range.start.to_string()),
            ("end", range.end.to_string()),
            ("step", range.step.to_string()),
        ];
        let result = self.get("query_range", &params, "matrix").await?;

        Ok(result
            .into_iter()
            .map(|series| SampleStream {
                labels: series.metric,
                values: series
                    .values
                    .into_iter()
                    .filter_map(|(ts, value)| value.parse::<f64>().ok().map(|v| (ts, v)))
                    .collect(),
            })
            .collect())
    }

    async fn query(&self, query: &str, time: i64) -> Result<Vec<Sample>, MetricsError> {
        debug!("Prometheus query: {}", query);
        let params = [("query", query.to_string()), ("time", time.to_string())];
        let result = self.get("query", &params, "vector").await?;

        Ok(result
            .into_iter()
            .filter_map(|series| {
                let value = series.value?.1.parse::<f64>().ok()?;
                Some(Sample {
                    labels: series.metric,
                    value,
                })
            })
            .collect())
    }
}
