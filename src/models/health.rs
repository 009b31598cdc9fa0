use std::collections::BTreeMap;

use serde::Serialize;

/// Request rates by protocol, then by response code
pub type RatesByCode = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestHealth {
    pub inbound: RatesByCode,
    pub outbound: RatesByCode,
}

impl RequestHealth {
    pub fn merge(&mut self, other: &RequestHealth) {
        for (target, source) in [
            (&mut self.inbound, &other.inbound),
            (&mut self.outbound, &other.outbound),
        ] {
            for (protocol, codes) in source {
                let merged = target.entry(protocol.clone()).or_default();
                for (code, rate) in codes {
                    *merged.entry(code.clone()).or_default() += rate;
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    pub name: String,
    pub desired_replicas: i32,
    pub current_replicas: i32,
    pub available_replicas: i32,
    /// Pods whose proxy is ready, -1 when the workload has no sidecar
    pub synced_proxies: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadHealth {
    pub workload_status: WorkloadStatus,
    pub requests: RequestHealth,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppHealth {
    pub workload_statuses: Vec<WorkloadStatus>,
    pub requests: RequestHealth,
}
