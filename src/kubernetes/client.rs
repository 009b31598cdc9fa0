//! Kubernetes client trait used by the business layer
//!
//! Listing calls return the raw k8s-openapi objects; the business layer owns
//! every interpretation of them. Tests replace the client with a mock.

use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Pod, ReplicationController, Service};

#[cfg(test)]
use mockall::automock;

use crate::kubernetes::error::ClientError;
use crate::kubernetes::openshift::DeploymentConfig;

/// Options for reading the logs of one container
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PodLogOptions {
    pub container: Option<String>,
    pub since_time: Option<DateTime<Utc>>,
}

/// Read-only access to the Kubernetes objects the console shows
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait K8sClient: Send + Sync {
    /// True when the cluster serves the OpenShift API groups
    fn is_openshift(&self) -> bool;

    /// Git version reported by the API server (e.g. "v1.29.2")
    async fn get_server_version(&self) -> Result<String, ClientError>;

    async fn get_namespace(&self, namespace: &str) -> Result<Namespace, ClientError>;

    async fn get_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClientError>;

    async fn get_deployment_configs(
        &self,
        namespace: &str,
    ) -> Result<Vec<DeploymentConfig>, ClientError>;

    async fn get_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClientError>;

    async fn get_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<ReplicationController>, ClientError>;

    async fn get_stateful_sets(&self, namespace: &str) -> Result<Vec<StatefulSet>, ClientError>;

    async fn get_daemon_sets(&self, namespace: &str) -> Result<Vec<DaemonSet>, ClientError>;

    async fn get_jobs(&self, namespace: &str) -> Result<Vec<Job>, ClientError>;

    async fn get_cron_jobs(&self, namespace: &str) -> Result<Vec<CronJob>, ClientError>;

    /// Lists pods, optionally filtered by a label selector ("" selects all)
    async fn get_pods(&self, namespace: &str, label_selector: &str)
    -> Result<Vec<Pod>, ClientError>;

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError>;

    /// Reads the logs of a pod container, one timestamped line per entry
    async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        options: &PodLogOptions,
    ) -> Result<String, ClientError>;

    async fn get_services(&self, namespace: &str) -> Result<Vec<Service>, ClientError>;
}
