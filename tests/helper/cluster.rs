//! In-memory Kubernetes cluster holding the bookinfo sample

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{Namespace, Pod, ReplicationController, Service};
use serde_json::json;

use meshscope::kubernetes::openshift::DeploymentConfig;
use meshscope::kubernetes::{ClientError, K8sClient, PodLogOptions};

pub const NAMESPACE: &str = "bookinfo";

pub const DETAILS_LOGS: &str = "2018-01-02T03:34:28+00:00 INFO #1 Log Message\n\
    2018-01-02T04:34:28+00:00 WARN #2 Log Message\n\
    2018-01-02T05:34:28+00:00 #3 Log Message\n\
    2018-01-02T06:34:28+00:00 #4 Log error Message";

#[derive(Default)]
pub struct FakeCluster {
    pub namespaces: Vec<Namespace>,
    pub deployments: Vec<Deployment>,
    pub replica_sets: Vec<ReplicaSet>,
    pub pods: Vec<Pod>,
    pub services: Vec<Service>,
    pub logs: String,
}

fn deployment(name: &str, app: &str, version: &str) -> Deployment {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "resourceVersion": "2021",
            "creationTimestamp": "2018-03-08T17:44:00Z",
            "labels": { "app": app, "version": version }
        },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": { "app": app, "version": version } },
            "template": {
                "metadata": { "labels": { "app": app, "version": version } },
                "spec": { "containers": [{ "name": app, "image": format!("bookinfo/{}", app) }] }
            }
        },
        "status": { "replicas": 1, "availableReplicas": 1 }
    }))
    .unwrap()
}

fn replica_set(name: &str, deployment: &str, app: &str, version: &str) -> ReplicaSet {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "creationTimestamp": "2018-03-08T17:44:00Z",
            "labels": { "app": app, "version": version },
            "ownerReferences": [{
                "apiVersion": "apps/v1",
                "kind": "Deployment",
                "name": deployment,
                "uid": format!("uid-{}", deployment),
                "controller": true
            }]
        },
        "spec": {
            "replicas": 1,
            "selector": { "matchLabels": { "app": app, "version": version } }
        },
        "status": { "replicas": 1, "availableReplicas": 1 }
    }))
    .unwrap()
}

fn pod(name: &str, replica_set: &str, app: &str, version: &str) -> Pod {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": NAMESPACE,
            "creationTimestamp": "2018-03-08T17:44:00Z",
            "labels": { "app": app, "version": version },
            "ownerReferences": [{
                "apiVersion": "apps/v1",
                "kind": "ReplicaSet",
                "name": replica_set,
                "uid": format!("uid-{}", replica_set),
                "controller": true
            }]
        },
        "spec": {
            "serviceAccountName": format!("bookinfo-{}", app),
            "containers": [
                { "name": app, "image": format!("bookinfo/{}", app) },
                { "name": "istio-proxy", "image": "istio/proxyv2:1.20.0" }
            ]
        },
        "status": {
            "phase": "Running",
            "containerStatuses": [
                { "name": app, "image": "", "imageID": "", "ready": true, "restartCount": 0 },
                { "name": "istio-proxy", "image": "", "imageID": "", "ready": true, "restartCount": 0 }
            ]
        }
    }))
    .unwrap()
}

fn service(name: &str) -> Service {
    serde_json::from_value(json!({
        "metadata": { "name": name, "namespace": NAMESPACE },
        "spec": {
            "selector": { "app": name },
            "ports": [{ "name": "http", "port": 9080, "protocol": "TCP" }]
        }
    }))
    .unwrap()
}

impl FakeCluster {
    /// details-v1, reviews-v1 and reviews-v2, each with one meshed pod
    pub fn bookinfo() -> Self {
        let workloads = [
            ("details-v1", "details", "v1"),
            ("reviews-v1", "reviews", "v1"),
            ("reviews-v2", "reviews", "v2"),
        ];

        let mut cluster = Self {
            namespaces: vec![
                serde_json::from_value(json!({
                    "metadata": {
                        "name": NAMESPACE,
                        "creationTimestamp": "2018-01-01T00:00:00Z",
                        "labels": { "istio-injection": "enabled" }
                    }
                }))
                .unwrap(),
            ],
            services: vec![service("details"), service("reviews")],
            logs: DETAILS_LOGS.to_string(),
            ..Default::default()
        };
        for (name, app, version) in workloads {
            let rs = format!("{}-3618568057", name);
            cluster.deployments.push(deployment(name, app, version));
            cluster.replica_sets.push(replica_set(&rs, name, app, version));
            cluster
                .pods
                .push(pod(&format!("{}-zbjmz", rs), &rs, app, version));
        }
        cluster
    }
}

fn in_namespace<T: Clone>(items: &[T], namespace: &str, ns_of: impl Fn(&T) -> Option<&str>) -> Vec<T> {
    items
        .iter()
        .filter(|item| ns_of(item) == Some(namespace))
        .cloned()
        .collect()
}

#[async_trait]
impl K8sClient for FakeCluster {
    fn is_openshift(&self) -> bool {
        false
    }

    async fn get_server_version(&self) -> Result<String, ClientError> {
        Ok("v1.29.2".to_string())
    }

    async fn get_namespace(&self, namespace: &str) -> Result<Namespace, ClientError> {
        self.namespaces
            .iter()
            .find(|ns| ns.metadata.name.as_deref() == Some(namespace))
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind: "Namespace".to_string(),
                name: namespace.to_string(),
            })
    }

    async fn get_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClientError> {
        Ok(in_namespace(&self.deployments, namespace, |d| {
            d.metadata.namespace.as_deref()
        }))
    }

    async fn get_deployment_configs(
        &self,
        _namespace: &str,
    ) -> Result<Vec<DeploymentConfig>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_replica_sets(&self, namespace: &str) -> Result<Vec<ReplicaSet>, ClientError> {
        Ok(in_namespace(&self.replica_sets, namespace, |rs| {
            rs.metadata.namespace.as_deref()
        }))
    }

    async fn get_replication_controllers(
        &self,
        _namespace: &str,
    ) -> Result<Vec<ReplicationController>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_stateful_sets(&self, _namespace: &str) -> Result<Vec<StatefulSet>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_daemon_sets(&self, _namespace: &str) -> Result<Vec<DaemonSet>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_jobs(&self, _namespace: &str) -> Result<Vec<Job>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_cron_jobs(&self, _namespace: &str) -> Result<Vec<CronJob>, ClientError> {
        Ok(Vec::new())
    }

    async fn get_pods(
        &self,
        namespace: &str,
        _label_selector: &str,
    ) -> Result<Vec<Pod>, ClientError> {
        Ok(in_namespace(&self.pods, namespace, |p| p.metadata.namespace.as_deref()))
    }

    async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, ClientError> {
        self.pods
            .iter()
            .find(|p| {
                p.metadata.namespace.as_deref() == Some(namespace)
                    && p.metadata.name.as_deref() == Some(name)
            })
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind: "Pod".to_string(),
                name: name.to_string(),
            })
    }

    async fn get_pod_logs(
        &self,
        namespace: &str,
        name: &str,
        _options: &PodLogOptions,
    ) -> Result<String, ClientError> {
        self.get_pod(namespace, name).await?;
        Ok(self.logs.clone())
    }

    async fn get_services(&self, namespace: &str) -> Result<Vec<Service>, ClientError> {
        Ok(in_namespace(&self.services, namespace, |s| {
            s.metadata.namespace.as_deref()
        }))
    }
}
