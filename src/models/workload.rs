use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::models::health::WorkloadHealth;
use crate::models::namespace::Namespace;
use crate::models::pod::Pod;
use crate::models::service::ServiceOverview;

/// Kind of the object a workload is built from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    DeploymentConfig,
    ReplicaSet,
    ReplicationController,
    StatefulSet,
    DaemonSet,
    CronJob,
    Job,
    Pod,
    /// A controller kind the console does not know, e.g. an operator CRD
    Custom(String),
}

impl WorkloadKind {
    pub const CONTROLLERS: [WorkloadKind; 8] = [
        WorkloadKind::Deployment,
        WorkloadKind::DeploymentConfig,
        WorkloadKind::ReplicaSet,
        WorkloadKind::ReplicationController,
        WorkloadKind::StatefulSet,
        WorkloadKind::DaemonSet,
        WorkloadKind::CronJob,
        WorkloadKind::Job,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DeploymentConfig => "DeploymentConfig",
            WorkloadKind::ReplicaSet => "ReplicaSet",
            WorkloadKind::ReplicationController => "ReplicationController",
            WorkloadKind::StatefulSet => "StatefulSet",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::CronJob => "CronJob",
            WorkloadKind::Job => "Job",
            WorkloadKind::Pod => "Pod",
            WorkloadKind::Custom(kind) => kind,
        }
    }

    /// Known controller kinds and bare pods; custom kinds are not
    pub fn is_known(&self) -> bool {
        !matches!(self, WorkloadKind::Custom(_))
    }

    /// Rank used when two kinds claim the same workload name; higher wins
    pub fn priority(&self) -> u8 {
        match self {
            WorkloadKind::Deployment => 8,
            WorkloadKind::DeploymentConfig => 7,
            WorkloadKind::ReplicaSet => 6,
            WorkloadKind::ReplicationController => 5,
            WorkloadKind::StatefulSet => 4,
            WorkloadKind::DaemonSet => 3,
            WorkloadKind::CronJob => 2,
            WorkloadKind::Job => 1,
            WorkloadKind::Pod | WorkloadKind::Custom(_) => 0,
        }
    }
}

impl From<&str> for WorkloadKind {
    fn from(kind: &str) -> Self {
        match kind {
            "Deployment" => WorkloadKind::Deployment,
            "DeploymentConfig" => WorkloadKind::DeploymentConfig,
            "ReplicaSet" => WorkloadKind::ReplicaSet,
            "ReplicationController" => WorkloadKind::ReplicationController,
            "StatefulSet" => WorkloadKind::StatefulSet,
            "DaemonSet" => WorkloadKind::DaemonSet,
            "CronJob" => WorkloadKind::CronJob,
            "Job" => WorkloadKind::Job,
            "Pod" => WorkloadKind::Pod,
            other => WorkloadKind::Custom(other.to_string()),
        }
    }
}

impl FromStr for WorkloadKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WorkloadKind::from(s))
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for WorkloadKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Runtime declared by the `kiali.io/runtimes` annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Runtime {
    pub name: String,
}

/// Extra information shown with a workload, taken from an annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalItem {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
    pub namespace: String,
    pub created_at: String,
    pub resource_version: String,
    pub labels: BTreeMap<String, String>,
    pub app_label: bool,
    pub version_label: bool,
    pub istio_sidecar: bool,
    pub desired_replicas: i32,
    pub current_replicas: i32,
    pub available_replicas: i32,
    pub pod_count: usize,
    pub pods: Vec<Pod>,
    pub runtimes: Vec<Runtime>,
    pub additional_details: Vec<AdditionalItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<ServiceOverview>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<WorkloadHealth>,
}

impl Workload {
    /// Value of the app label, if the workload carries one
    pub fn app<'a>(&'a self, app_label_name: &str) -> Option<&'a str> {
        self.labels.get(app_label_name).map(String::as_str)
    }

    pub fn service_account_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pods
            .iter()
            .filter(|pod| !pod.service_account_name.is_empty())
            .map(|pod| pod.service_account_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadListItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: WorkloadKind,
    pub created_at: String,
    pub resource_version: String,
    pub labels: BTreeMap<String, String>,
    pub app_label: bool,
    pub version_label: bool,
    pub istio_sidecar: bool,
    pub pod_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<WorkloadHealth>,
}

impl From<&Workload> for WorkloadListItem {
    fn from(workload: &Workload) -> Self {
        Self {
            name: workload.name.clone(),
            kind: workload.kind.clone(),
            created_at: workload.created_at.clone(),
            resource_version: workload.resource_version.clone(),
            labels: workload.labels.clone(),
            app_label: workload.app_label,
            version_label: workload.version_label,
            istio_sidecar: workload.istio_sidecar,
            pod_count: workload.pod_count,
            health: workload.health.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadList {
    pub namespace: Namespace,
    pub workloads: Vec<WorkloadListItem>,
}
