//! Serializable views returned by the HTTP API

pub mod app;
pub mod dashboard;
pub mod health;
pub mod logs;
pub mod namespace;
pub mod pod;
pub mod service;
pub mod time;
pub mod workload;

pub use app::{App, AppList, AppListItem, AppWorkload};
pub use dashboard::{Aggregation, Chart, Metric, MonitoringDashboard};
pub use health::{AppHealth, RequestHealth, WorkloadHealth, WorkloadStatus};
pub use logs::{AccessLog, LogEntry, PodLog};
pub use namespace::Namespace;
pub use pod::Pod;
pub use service::ServiceOverview;
pub use workload::{Workload, WorkloadKind, WorkloadList, WorkloadListItem};
