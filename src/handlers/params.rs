//! Query string parameters shared by the handlers

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::business::logs::LogOptions;
use crate::business::{BusinessError, DashboardQuery, Direction};
use crate::config::DEFAULT_RATE_INTERVAL;
use crate::models::time::parse_duration;

fn unix_time(seconds: Option<i64>, name: &str) -> Result<DateTime<Utc>, BusinessError> {
    match seconds {
        None => Ok(Utc::now()),
        Some(seconds) => DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| BusinessError::BadRequest(format!("Invalid {}: {}", name, seconds))),
    }
}

/// `health`, `rateInterval` and `queryTime`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthParams {
    /// Health is included when present and non-empty
    pub health: Option<String>,
    pub rate_interval: Option<String>,
    /// Unix seconds, now when absent
    pub query_time: Option<i64>,
}

impl HealthParams {
    pub fn include_health(&self) -> bool {
        self.health.as_deref().is_some_and(|h| !h.is_empty())
    }

    pub fn rate_interval(&self) -> String {
        self.rate_interval
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_RATE_INTERVAL.to_string())
    }

    pub fn query_time(&self) -> Result<DateTime<Utc>, BusinessError> {
        unix_time(self.query_time, "queryTime")
    }
}

/// Health parameters plus the `workloadType` hint. Kept flat since
/// flattened numbers do not deserialize from query strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadParams {
    /// Kind hint for workloads sharing a name
    pub workload_type: Option<String>,
    pub health: Option<String>,
    pub rate_interval: Option<String>,
    pub query_time: Option<i64>,
}

impl WorkloadParams {
    pub fn health_params(&self) -> HealthParams {
        HealthParams {
            health: self.health.clone(),
            rate_interval: self.rate_interval.clone(),
            query_time: self.query_time,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogParams {
    pub container: Option<String>,
    /// Unix seconds
    pub since_time: Option<i64>,
    /// Window after the first entry, e.g. `1h`
    pub duration: Option<String>,
    pub max_lines: Option<usize>,
    pub is_proxy: Option<bool>,
}

impl LogParams {
    pub fn options(&self) -> Result<LogOptions, BusinessError> {
        let duration = match self.duration.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_duration(value).ok_or_else(|| {
                BusinessError::BadRequest(format!("Invalid duration: {}", value))
            })?),
        };
        let since_time = match self.since_time {
            None => None,
            Some(seconds) => Some(unix_time(Some(seconds), "sinceTime")?),
        };

        Ok(LogOptions {
            container: self.container.clone(),
            since_time,
            duration,
            max_lines: self.max_lines,
            is_proxy: self.is_proxy.unwrap_or(false),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub direction: Option<String>,
    /// Seconds
    pub duration: Option<i64>,
    /// Seconds
    pub step: Option<i64>,
    pub query_time: Option<i64>,
    pub rate_interval: Option<String>,
    /// Comma separated label names
    pub by_labels: Option<String>,
}

impl DashboardParams {
    pub fn query(&self) -> Result<DashboardQuery, BusinessError> {
        let mut query = DashboardQuery::new(unix_time(self.query_time, "queryTime")?);
        if let Some(direction) = self.direction.as_deref() {
            query.direction = direction.parse::<Direction>()?;
        }
        if let Some(duration) = self.duration {
            query.duration = duration;
        }
        if let Some(step) = self.step {
            query.step = step;
        }
        if let Some(rate_interval) = self.rate_interval.clone().filter(|r| !r.is_empty()) {
            query.rate_interval = rate_interval;
        }
        query.by_labels = self
            .by_labels
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();
        Ok(query)
    }
}
