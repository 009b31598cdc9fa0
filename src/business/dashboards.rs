//! Istio metrics dashboards of apps, services and workloads
//!
//! A dashboard is a fixed set of charts. Every chart is one or more
//! Prometheus range queries over the standard Istio metrics, filtered on
//! the object and the traffic direction. A chart whose query fails carries
//! the error and the rest of the dashboard is still returned.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::business::error::BusinessError;
use crate::config::{DEFAULT_DASHBOARD_DURATION_SECS, DEFAULT_DASHBOARD_STEP_SECS, DEFAULT_RATE_INTERVAL};
use crate::models::time::parse_duration;
use crate::models::{Aggregation, Chart, Metric, MonitoringDashboard};
use crate::prometheus::{MetricsClient, MetricsError, QueryRange};

const QUANTILES: [&str; 3] = ["0.5", "0.95", "0.99"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    App,
    Service,
    Workload,
}

impl FromStr for ObjectType {
    type Err = BusinessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apps" => Ok(ObjectType::App),
            "services" => Ok(ObjectType::Service),
            "workloads" => Ok(ObjectType::Workload),
            other => Err(BusinessError::BadRequest(format!(
                "Unknown object type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Inbound,
    Outbound,
}

impl Direction {
    fn reporter(self) -> &'static str {
        match self {
            Direction::Inbound => "destination",
            Direction::Outbound => "source",
        }
    }

    /// Label prefix of the object the dashboard is about
    fn local(self) -> &'static str {
        self.reporter()
    }

    /// Label prefix of the peers of that object
    fn remote(self) -> &'static str {
        match self {
            Direction::Inbound => "source",
            Direction::Outbound => "destination",
        }
    }
}

impl FromStr for Direction {
    type Err = BusinessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Direction::Inbound),
            "outbound" => Ok(Direction::Outbound),
            other => Err(BusinessError::BadRequest(format!(
                "Unknown direction: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("Inbound"),
            Direction::Outbound => f.write_str("Outbound"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardQuery {
    pub direction: Direction,
    /// Seconds before `query_time`
    pub duration: i64,
    pub step: i64,
    pub query_time: DateTime<Utc>,
    pub rate_interval: String,
    pub by_labels: Vec<String>,
}

impl DashboardQuery {
    pub fn new(query_time: DateTime<Utc>) -> Self {
        Self {
            direction: Direction::default(),
            duration: DEFAULT_DASHBOARD_DURATION_SECS,
            step: DEFAULT_DASHBOARD_STEP_SECS,
            query_time,
            rate_interval: DEFAULT_RATE_INTERVAL.to_string(),
            by_labels: Vec::new(),
        }
    }

    fn range(&self) -> QueryRange {
        let end = self.query_time.timestamp();
        QueryRange {
            start: end - self.duration,
            end,
            step: self.step,
        }
    }

    fn validate(&self) -> Result<(), BusinessError> {
        if self.duration <= 0 || self.step <= 0 {
            return Err(BusinessError::BadRequest(
                "Duration and step must be positive".to_string(),
            ));
        }
        if parse_duration(&self.rate_interval).is_none() {
            return Err(BusinessError::BadRequest(format!(
                "Invalid rate interval: {}",
                self.rate_interval
            )));
        }
        if let Some(label) = self.by_labels.iter().find(|l| !is_label_name(l)) {
            return Err(BusinessError::BadRequest(format!(
                "Invalid label name: {}",
                label
            )));
        }
        Ok(())
    }
}

fn is_label_name(label: &str) -> bool {
    let mut chars = label.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(Debug, Clone, Copy)]
enum MetricKind {
    Counter,
    Histogram,
}

struct ChartDef {
    id: &'static str,
    title: &'static str,
    unit: &'static str,
    metric: &'static str,
    kind: MetricKind,
}

const CHARTS: [ChartDef; 6] = [
    ChartDef {
        id: "request_count",
        title: "Request volume",
        unit: "ops",
        metric: "istio_requests_total",
        kind: MetricKind::Counter,
    },
    ChartDef {
        id: "request_duration",
        title: "Request duration",
        unit: "milliseconds",
        metric: "istio_request_duration_milliseconds",
        kind: MetricKind::Histogram,
    },
    ChartDef {
        id: "request_size",
        title: "Request size",
        unit: "bytes",
        metric: "istio_request_bytes",
        kind: MetricKind::Histogram,
    },
    ChartDef {
        id: "response_size",
        title: "Response size",
        unit: "bytes",
        metric: "istio_response_bytes",
        kind: MetricKind::Histogram,
    },
    ChartDef {
        id: "tcp_received",
        title: "TCP received",
        unit: "bytes/s",
        metric: "istio_tcp_received_bytes_total",
        kind: MetricKind::Counter,
    },
    ChartDef {
        id: "tcp_sent",
        title: "TCP sent",
        unit: "bytes/s",
        metric: "istio_tcp_sent_bytes_total",
        kind: MetricKind::Counter,
    },
];

/// Query of one series of a chart, with the stat it computes
struct SeriesQuery {
    stat: Option<String>,
    promql: String,
}

impl ChartDef {
    fn queries(&self, filters: &str, rate_interval: &str, by_labels: &[String]) -> Vec<SeriesQuery> {
        let by = by_labels.join(",");
        let grouped = |expr: String| {
            if by.is_empty() {
                format!("sum({})", expr)
            } else {
                format!("sum({}) by ({})", expr, by)
            }
        };
        let rate = |suffix: &str| {
            format!(
                "rate({}{}{{{}}}[{}])",
                self.metric, suffix, filters, rate_interval
            )
        };

        match self.kind {
            MetricKind::Counter => vec![SeriesQuery {
                stat: None,
                promql: grouped(rate("")),
            }],
            MetricKind::Histogram => {
                let mut queries = vec![SeriesQuery {
                    stat: Some("avg".to_string()),
                    promql: format!("{} / {}", grouped(rate("_sum")), grouped(rate("_count"))),
                }];
                let bucket_by = if by.is_empty() {
                    "le".to_string()
                } else {
                    format!("le,{}", by)
                };
                queries.extend(QUANTILES.iter().map(|q| SeriesQuery {
                    stat: Some(q.to_string()),
                    promql: format!(
                        "histogram_quantile({}, sum({}) by ({}))",
                        q,
                        rate("_bucket"),
                        bucket_by
                    ),
                }));
                queries
            }
        }
    }
}

fn aggregations(object_type: ObjectType, direction: Direction) -> Vec<Aggregation> {
    let local = direction.local();
    let remote = direction.remote();
    let aggregation = |label: String, display_name: &str| Aggregation {
        label,
        display_name: display_name.to_string(),
    };

    let mut aggregations = Vec::new();
    if object_type == ObjectType::App {
        aggregations.push(aggregation(
            format!("{}_canonical_revision", local),
            "Local version",
        ));
    }
    if object_type == ObjectType::Service {
        aggregations.push(aggregation(
            "destination_workload".to_string(),
            "Local workload",
        ));
    }
    aggregations.extend([
        aggregation(format!("{}_workload_namespace", remote), "Remote namespace"),
        aggregation(format!("{}_canonical_service", remote), "Remote app"),
        aggregation(format!("{}_canonical_revision", remote), "Remote version"),
        aggregation("response_code".to_string(), "Response code"),
        aggregation("grpc_response_status".to_string(), "gRPC status"),
        aggregation("response_flags".to_string(), "Response flags"),
    ]);
    aggregations
}

/// Label selector of the traffic of an object
fn filters(object_type: ObjectType, direction: Direction, namespace: &str, name: &str) -> String {
    // Service metrics are only reported on the destination side
    let direction = match object_type {
        ObjectType::Service => Direction::Inbound,
        _ => direction,
    };
    let local = direction.local();
    let (name_label, namespace_label) = match object_type {
        ObjectType::App => (
            format!("{}_canonical_service", local),
            format!("{}_workload_namespace", local),
        ),
        ObjectType::Workload => (
            format!("{}_workload", local),
            format!("{}_workload_namespace", local),
        ),
        ObjectType::Service => (
            "destination_service_name".to_string(),
            "destination_service_namespace".to_string(),
        ),
    };
    format!(
        r#"reporter="{}",{}="{}",{}="{}""#,
        direction.reporter(),
        namespace_label,
        escape(namespace),
        name_label,
        escape(name)
    )
}

#[derive(Clone)]
pub struct DashboardService {
    metrics: Arc<dyn MetricsClient>,
}

impl DashboardService {
    pub fn new(metrics: Arc<dyn MetricsClient>) -> Self {
        Self { metrics }
    }

    async fn chart(&self, def: &ChartDef, filters: &str, query: &DashboardQuery) -> Chart {
        let range = query.range();
        let series = def.queries(filters, &query.rate_interval, &query.by_labels);
        let results = join_all(
            series
                .iter()
                .map(|s| self.metrics.query_range(&s.promql, &range)),
        )
        .await;

        let mut chart = Chart {
            name: def.title.to_string(),
            unit: def.unit.to_string(),
            spans: 4,
            metrics: Vec::new(),
            error: None,
        };
        for (series_query, result) in series.iter().zip(results) {
            match result {
                Ok(streams) => chart.metrics.extend(streams.into_iter().map(|stream| Metric {
                    name: def.id.to_string(),
                    labels: stream.labels,
                    datapoints: stream.values,
                    stat: series_query.stat.clone(),
                })),
                Err(e) => {
                    warn!("Chart {} failed: {}", def.id, e);
                    chart.metrics.clear();
                    chart.error = Some(chart_error(&e));
                    break;
                }
            }
        }
        chart
    }

    pub async fn build_dashboard(
        &self,
        object_type: ObjectType,
        namespace: &str,
        name: &str,
        query: &DashboardQuery,
    ) -> Result<MonitoringDashboard, BusinessError> {
        query.validate()?;
        let filters = filters(object_type, query.direction, namespace, name);
        debug!("Dashboard of {:?} {}/{}: {}", object_type, namespace, name, filters);

        let charts = join_all(CHARTS.iter().map(|def| self.chart(def, &filters, query))).await;

        Ok(MonitoringDashboard {
            name: "istio".to_string(),
            title: format!("{} Metrics", query.direction),
            charts,
            aggregations: aggregations(object_type, query.direction),
        })
    }
}

fn chart_error(error: &MetricsError) -> String {
    match error {
        MetricsError::Query { message, .. } => message.clone(),
        other => other.to_string(),
    }
}
