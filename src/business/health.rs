//! Workload and app health
//!
//! Health has two parts: the replica status read from the workload itself,
//! and request rates by response code read from Istio telemetry over the
//! rate interval.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::business::error::BusinessError;
use crate::models::{RequestHealth, Workload, WorkloadStatus};
use crate::prometheus::{MetricsClient, Sample};

/// Object whose request health is aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthTarget {
    App,
    Workload,
}

impl HealthTarget {
    fn label(self, side: &str) -> String {
        match self {
            HealthTarget::App => format!("{}_canonical_service", side),
            HealthTarget::Workload => format!("{}_workload", side),
        }
    }
}

pub fn workload_status(workload: &Workload) -> WorkloadStatus {
    let synced_proxies = if workload.istio_sidecar {
        workload.pods.iter().filter(|pod| pod.proxy_ready()).count() as i32
    } else {
        -1
    };

    WorkloadStatus {
        name: workload.name.clone(),
        desired_replicas: workload.desired_replicas,
        current_replicas: workload.current_replicas,
        available_replicas: workload.available_replicas,
        synced_proxies,
    }
}

#[derive(Clone)]
pub struct HealthService {
    metrics: Arc<dyn MetricsClient>,
}

impl HealthService {
    pub fn new(metrics: Arc<dyn MetricsClient>) -> Self {
        Self { metrics }
    }

    /// Request rates of every app or workload of a namespace, keyed by name.
    /// Objects without traffic are absent.
    pub async fn namespace_request_health(
        &self,
        namespace: &str,
        target: HealthTarget,
        rate_interval: &str,
        query_time: DateTime<Utc>,
    ) -> Result<HashMap<String, RequestHealth>, BusinessError> {
        let inbound_label = target.label("destination");
        let outbound_label = target.label("source");
        let inbound_query = format!(
            r#"sum(rate(istio_requests_total{{reporter="destination",destination_workload_namespace="{}"}}[{}])) by ({}, request_protocol, response_code) > 0"#,
            namespace, rate_interval, inbound_label
        );
        let outbound_query = format!(
            r#"sum(rate(istio_requests_total{{reporter="source",source_workload_namespace="{}"}}[{}])) by ({}, request_protocol, response_code) > 0"#,
            namespace, rate_interval, outbound_label
        );
        let time = query_time.timestamp();

        let (inbound, outbound) = futures::try_join!(
            self.metrics.query(&inbound_query, time),
            self.metrics.query(&outbound_query, time),
        )?;
        debug!(
            "Request health of namespace {}: {} inbound and {} outbound series",
            namespace,
            inbound.len(),
            outbound.len()
        );

        let mut health: HashMap<String, RequestHealth> = HashMap::new();
        for sample in &inbound {
            if let Some((name, protocol, code)) = keys(sample, &inbound_label) {
                *health
                    .entry(name)
                    .or_default()
                    .inbound
                    .entry(protocol)
                    .or_default()
                    .entry(code)
                    .or_default() += sample.value;
            }
        }
        for sample in &outbound {
            if let Some((name, protocol, code)) = keys(sample, &outbound_label) {
                *health
                    .entry(name)
                    .or_default()
                    .outbound
                    .entry(protocol)
                    .or_default()
                    .entry(code)
                    .or_default() += sample.value;
            }
        }
        Ok(health)
    }
}

fn keys(sample: &Sample, name_label: &str) -> Option<(String, String, String)> {
    let name = sample.labels.get(name_label)?;
    let protocol = sample
        .labels
        .get("request_protocol")
        .cloned()
        .unwrap_or_else(|| "http".to_string());
    let code = sample.labels.get("response_code")?;
    Some((name.clone(), protocol, code.clone()))
}
