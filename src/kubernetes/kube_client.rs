//! K8sClient backed by a real API server connection

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Pod, ReplicationController, Service};
use kube::api::{Api, ListParams, LogParams};
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::kubernetes::client::{K8sClient, PodLogOptions};
use crate::kubernetes::error::ClientError;
use crate::kubernetes::openshift::DeploymentConfig;

const OPENSHIFT_API_GROUP: &str = "apps.openshift.io";

pub struct KubeClient {
    client: Client,
    openshift: bool,
}

impl KubeClient {
    /// Connects using the in-cluster config or the local kubeconfig and
    /// probes the API groups once
    pub async fn try_default() -> Result<Self, ClientError> {
        let client = Client::try_default()
            .await
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(client).await
    }

    pub async fn new(client: Client) -> Result<Self, ClientError> {
        let groups = client.list_api_groups().await?;
        let openshift = groups
            .groups
            .iter()
            .any(|group| group.name == OPENSHIFT_API_GROUP);
        info!("Connected to Kubernetes (openshift: {})", openshift);

        Ok(Self { client, openshift })
    }

    async fn list<K>(&self, namespace: &str, params: &ListParams) -> Result<Vec<K>, ClientError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + std::fmt::Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(params).await?;
        debug!(
            "Listed {} {} in namespace {}",
            list.items.len(),
            K::kind(&K::DynamicType::default()),
            namespace
        );
        Ok(list.items)
    }
}

#[async_trait]
impl K8sClient for KubeClient {
    fn is_openshift(&self) -> bool {
        self.openshift
    }

    async fn get_server_version(&self) -> Result<String, ClientError> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Namespace, ClientError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get(namespace)
            .await
            .map_err(|e| ClientError::for_object(e, "Namespace", namespace))
    }

    async fn get_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_deployment_configs(
        &self,
        namespace: &str,
    ) -> Result<Vec<DeploymentConfig>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_replication_controllers(
        &self,
        namespace: &str,
    ) -> Result<Vec<ReplicationController>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_stateful_sets(&self, namespace: &str) -> Result<Vec<StatefulSet>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_daemon_sets(&self, namespace: &str) -> Result<Vec<DaemonSet>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_jobs(&self, namespace: &str) -> Result<Vec<Job>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_cron_jobs(&self, namespace: &str) -> Result<Vec<CronJob>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }

    async fn get_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<Pod>, ClientError> {
        let mut params = ListParams::default();
        if !label_selector.is_empty() {
            params = params.labels(label_selector);
        }
        self.list(namespace, &params).await
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| ClientError::for_object(e, "Pod", name))
    }

    async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        options: &PodLogOptions,
    ) -> Result<String, ClientError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = LogParams {
            container: options.container.clone(),
            since_time: options.since_time,
            timestamps: true,
            ..LogParams::default()
        };
        api.logs(name, &params)
            .await
            .map_err(|e| ClientError::for_object(e, "Pod", name))
    }

    async fn get_services(&self, namespace: &str) -> Result<Vec<Service>, ClientError> {
        self.list(namespace, &ListParams::default()).await
    }
}
