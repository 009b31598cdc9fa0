//! Pod log parsing
//!
//! Kubernetes returns logs requested with timestamps as
//! `<RFC3339 timestamp> <message>` lines. Each line becomes a [`LogEntry`];
//! lines of proxy containers are also matched against the Envoy access log
//! format used by Istio.

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use tracing::debug;

use crate::models::{AccessLog, LogEntry, PodLog};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Options of a log request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogOptions {
    pub container: Option<String>,
    pub since_time: Option<DateTime<Utc>>,
    /// Entries later than the first entry plus this duration are dropped
    pub duration: Option<TimeDelta>,
    pub max_lines: Option<usize>,
    /// Parse Envoy access logs
    pub is_proxy: bool,
}

pub struct LogParser {
    severity_re: Regex,
    access_log_re: Regex,
}

impl Default for LogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser {
    pub fn new() -> Self {
        Self {
            severity_re: Regex::new(r"(?i)ERROR|WARN|DEBUG|TRACE").unwrap(),
            access_log_re: Regex::new(concat!(
                r#"^\[(?P<timestamp>\d{4}-\d\d-\d\dT\d\d:\d\d:\d\d(?:\.\d+)?\S*)\] "#,
                r#""(?P<method>\S+) (?P<uri_path>\S+) (?P<protocol>[^"]+)" "#,
                r#"(?P<status_code>\d+) (?P<response_flags>\S+) \S+ \S+ "#,
                r#""(?P<upstream_failure_reason>[^"]*)" "#,
                r#"(?P<bytes_received>\d+) (?P<bytes_sent>\d+) (?P<duration>\d+) (?P<upstream_service_time>\S+) "#,
                r#""(?P<forwarded_for>[^"]*)" "(?P<user_agent>[^"]*)" "(?P<request_id>[^"]*)" "#,
                r#""(?P<authority>[^"]*)" "(?P<upstream_service>[^"]*)" "#,
                r#"(?P<upstream_cluster>\S+) (?P<upstream_local>\S+) (?P<downstream_local>\S+) "#,
                r#"(?P<downstream_remote>\S+) (?P<requested_server>\S+) (?P<route_name>\S+)"#,
            ))
            .unwrap(),
        }
    }

    /// Severity named first in the message, INFO when none is
    pub fn severity(&self, message: &str) -> String {
        self.severity_re
            .find(message)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_else(|| "INFO".to_string())
    }

    pub fn access_log(&self, message: &str) -> Option<AccessLog> {
        let caps = self.access_log_re.captures(message)?;
        let field = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Some(AccessLog {
            timestamp: field("timestamp"),
            method: field("method"),
            uri_path: field("uri_path"),
            protocol: field("protocol"),
            status_code: field("status_code"),
            response_flags: field("response_flags"),
            route_name: field("route_name"),
            upstream_failure_reason: field("upstream_failure_reason"),
            bytes_received: field("bytes_received"),
            bytes_sent: field("bytes_sent"),
            duration: field("duration"),
            upstream_service_time: field("upstream_service_time"),
            forwarded_for: field("forwarded_for"),
            user_agent: field("user_agent"),
            request_id: field("request_id"),
            authority: field("authority"),
            upstream_service: field("upstream_service"),
            upstream_cluster: field("upstream_cluster"),
            upstream_local: field("upstream_local"),
            downstream_local: field("downstream_local"),
            downstream_remote: field("downstream_remote"),
            requested_server: field("requested_server"),
        })
    }

    /// One log line, `None` when it does not start with a timestamp
    pub fn parse_line(&self, line: &str, is_proxy: bool) -> Option<(DateTime<Utc>, LogEntry)> {
        let (raw_time, rest) = line.split_once(' ')?;
        let mut time = DateTime::parse_from_rfc3339(raw_time)
            .ok()?
            .with_timezone(&Utc);
        let message = rest.trim_start().to_string();

        let access_log = if is_proxy {
            self.access_log(&message)
        } else {
            None
        };
        if let Some(start) = access_log
            .as_ref()
            .and_then(|log| DateTime::parse_from_rfc3339(&log.timestamp).ok())
        {
            time = start.with_timezone(&Utc);
        }

        let entry = LogEntry {
            severity: self.severity(&message),
            message,
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            timestamp_unix: time.timestamp_millis(),
            access_log,
        };
        Some((time, entry))
    }

    /// Parses a whole log.
    ///
    /// The window starts at the first entry. Parsing stops at the first entry
    /// past the window or when `max_lines` entries were taken.
    /// `lines_truncated` is set only in the latter case and only when another
    /// entry inside the window was left out.
    pub fn parse(&self, logs: &str, options: &LogOptions) -> PodLog {
        let mut entries = Vec::new();
        let mut lines_truncated = false;
        let mut window_end: Option<DateTime<Utc>> = None;

        for line in logs.lines() {
            let Some((time, entry)) = self.parse_line(line, options.is_proxy) else {
                debug!("Skipping log line without timestamp: {}", line);
                continue;
            };

            if window_end.is_some_and(|end| time > end) {
                break;
            }
            if options.max_lines.is_some_and(|max| entries.len() >= max) {
                lines_truncated = true;
                break;
            }
            if entries.is_empty() {
                window_end = options.duration.map(|d| time + d);
            }
            entries.push(entry);
        }

        PodLog {
            entries,
            lines_truncated,
        }
    }
}
