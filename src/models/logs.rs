use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodLog {
    pub entries: Vec<LogEntry>,
    pub lines_truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub message: String,
    pub severity: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS.mmm`
    pub timestamp: String,
    /// Milliseconds since the epoch
    pub timestamp_unix: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log: Option<AccessLog>,
}

/// Fields of an Envoy access log line in the default Istio format
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub timestamp: String,
    pub method: String,
    pub uri_path: String,
    pub protocol: String,
    pub status_code: String,
    pub response_flags: String,
    pub route_name: String,
    pub upstream_failure_reason: String,
    pub bytes_received: String,
    pub bytes_sent: String,
    pub duration: String,
    pub upstream_service_time: String,
    pub forwarded_for: String,
    pub user_agent: String,
    pub request_id: String,
    pub authority: String,
    pub upstream_service: String,
    pub upstream_cluster: String,
    pub upstream_local: String,
    pub downstream_local: String,
    pub downstream_remote: String,
    pub requested_server: String,
}
