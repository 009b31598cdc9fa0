//! Kubernetes objects shared by the business layer tests

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{self as core, ReplicationController, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::business::controllers::Listings;
use crate::kubernetes::openshift::{DeploymentConfig, DeploymentConfigSpec};

pub const CREATED: &str = "2018-03-08T17:44:00Z";

fn from_json<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}

pub fn namespace_listings() -> Listings {
    Listings {
        namespace: "Namespace".to_string(),
        ..Default::default()
    }
}

pub fn fake_namespace(name: &str) -> core::Namespace {
    from_json(json!({
        "metadata": {
            "name": name,
            "labels": { "istio-injection": "enabled" },
            "creationTimestamp": CREATED
        }
    }))
}

fn owner(api_version: &str, kind: &str, name: &str) -> Value {
    json!({
        "apiVersion": api_version,
        "kind": kind,
        "name": name,
        "uid": format!("{}-uid", name),
        "controller": true
    })
}

/// Replaces the controller of every item
pub fn with_controller<K: Resource>(
    mut items: Vec<K>,
    api_version: &str,
    kind: &str,
    name: &str,
) -> Vec<K> {
    let reference: OwnerReference = from_json(owner(api_version, kind, name));
    for item in &mut items {
        item.meta_mut().owner_references = Some(vec![reference.clone()]);
    }
    items
}

fn httpbin_templates() -> Vec<(&'static str, Value)> {
    vec![
        ("httpbin-v1", json!({ "app": "httpbin" })),
        ("httpbin-v2", json!({ "app": "httpbin", "version": "v2" })),
        ("httpbin-v3", json!({})),
    ]
}

fn template(labels: Value) -> Value {
    json!({
        "metadata": { "labels": labels },
        "spec": { "containers": [{ "name": "httpbin", "image": "kennethreitz/httpbin" }] }
    })
}

fn deployment(name: &str, labels: Value) -> Deployment {
    from_json(json!({
        "metadata": { "name": name, "creationTimestamp": CREATED },
        "spec": { "replicas": 1, "selector": {}, "template": template(labels) },
        "status": { "replicas": 1, "availableReplicas": 1 }
    }))
}

fn replica_set(name: &str, labels: Value, owners: Value) -> ReplicaSet {
    from_json(json!({
        "metadata": { "name": name, "creationTimestamp": CREATED, "ownerReferences": owners },
        "spec": { "replicas": 1, "selector": {}, "template": template(labels) },
        "status": { "replicas": 1, "availableReplicas": 1 }
    }))
}

fn stateful_set(name: &str, labels: Value) -> StatefulSet {
    from_json(json!({
        "metadata": { "name": name, "creationTimestamp": CREATED },
        "spec": {
            "replicas": 1,
            "serviceName": name,
            "selector": {},
            "template": template(labels)
        },
        "status": { "replicas": 1, "availableReplicas": 1 }
    }))
}

pub fn fake_deployments() -> Vec<Deployment> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| deployment(name, labels))
        .collect()
}

pub fn fake_replica_sets() -> Vec<ReplicaSet> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| replica_set(name, labels, json!([])))
        .collect()
}

pub fn fake_replication_controllers() -> Vec<ReplicationController> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| {
            from_json(json!({
                "metadata": { "name": name, "creationTimestamp": CREATED },
                "spec": { "replicas": 1, "template": template(labels) },
                "status": { "replicas": 1, "availableReplicas": 1 }
            }))
        })
        .collect()
}

pub fn fake_deployment_configs() -> Vec<DeploymentConfig> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| {
            DeploymentConfig::new(
                name,
                DeploymentConfigSpec {
                    replicas: Some(1),
                    selector: None,
                    template: Some(from_json(template(labels))),
                },
            )
        })
        .collect()
}

pub fn fake_stateful_sets() -> Vec<StatefulSet> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| stateful_set(name, labels))
        .collect()
}

pub fn fake_daemon_sets() -> Vec<DaemonSet> {
    httpbin_templates()
        .into_iter()
        .map(|(name, labels)| {
            from_json(json!({
                "metadata": { "name": name, "creationTimestamp": CREATED },
                "spec": { "selector": {}, "template": template(labels) },
                "status": {
                    "desiredNumberScheduled": 1,
                    "currentNumberScheduled": 1,
                    "numberAvailable": 1,
                    "numberMisscheduled": 0,
                    "numberReady": 1
                }
            }))
        })
        .collect()
}

fn pod(name: &str, labels: Value, owners: Value, proxy_ready: Option<bool>) -> core::Pod {
    let mut containers = vec![json!({ "name": "app", "image": "docker.io/app:1.0" })];
    let mut statuses = vec![json!({
        "name": "app",
        "ready": true,
        "restartCount": 0,
        "image": "docker.io/app:1.0",
        "imageID": "docker.io/app@sha256:1"
    })];
    if let Some(ready) = proxy_ready {
        containers.push(json!({ "name": "istio-proxy", "image": "docker.io/istio/proxyv2:1.20.0" }));
        statuses.push(json!({
            "name": "istio-proxy",
            "ready": ready,
            "restartCount": 0,
            "image": "docker.io/istio/proxyv2:1.20.0",
            "imageID": "docker.io/istio/proxyv2@sha256:2"
        }));
    }

    from_json(json!({
        "metadata": {
            "name": name,
            "labels": labels,
            "creationTimestamp": CREATED,
            "ownerReferences": owners
        },
        "spec": {
            "containers": containers,
            "serviceAccountName": "bookinfo-details"
        },
        "status": { "phase": "Running", "containerStatuses": statuses }
    }))
}

pub fn fake_dep_synced_with_rs() -> Vec<Deployment> {
    vec![deployment(
        "details-v1",
        json!({ "app": "details", "version": "v1" }),
    )]
}

pub fn fake_rs_synced_with_pods() -> Vec<ReplicaSet> {
    vec![replica_set(
        "details-v1-3618568057",
        json!({ "app": "details", "version": "v1" }),
        json!([owner("apps/v1", "Deployment", "details-v1")]),
    )]
}

pub fn fake_pods_synced_with_deployments() -> Vec<core::Pod> {
    vec![pod(
        "details-v1-3618568057-dnkjp",
        json!({ "app": "details", "version": "v1" }),
        json!([owner("apps/v1", "ReplicaSet", "details-v1-3618568057")]),
        Some(true),
    )]
}

pub fn fake_orphan_pods() -> Vec<core::Pod> {
    vec![pod(
        "orphan-pod",
        json!({ "app": "orphan", "version": "v1" }),
        json!([]),
        None,
    )]
}

pub fn fake_custom_controller_rs_synced_with_pods() -> Vec<ReplicaSet> {
    vec![replica_set(
        "custom-controller-RS-123",
        json!({ "app": "custom", "version": "v1" }),
        json!([owner("example.com/v1", "CustomController", "custom-controller")]),
    )]
}

pub fn fake_pods_from_custom_controller() -> Vec<core::Pod> {
    vec![pod(
        "custom-controller-pod",
        json!({ "app": "custom", "version": "v1" }),
        json!([owner("apps/v1", "ReplicaSet", "custom-controller-RS-123")]),
        Some(true),
    )]
}

pub fn fake_duplicated_deployments() -> Vec<Deployment> {
    vec![deployment(
        "duplicated-v1",
        json!({ "app": "duplicated", "version": "v1" }),
    )]
}

pub fn fake_duplicated_replica_sets() -> Vec<ReplicaSet> {
    vec![replica_set(
        "duplicated-v1-12345",
        json!({ "app": "duplicated", "version": "v1" }),
        json!([owner("apps/v1", "Deployment", "duplicated-v1")]),
    )]
}

pub fn fake_duplicated_stateful_sets() -> Vec<StatefulSet> {
    vec![stateful_set(
        "duplicated-v1",
        json!({ "app": "duplicated", "version": "v1" }),
    )]
}

pub fn fake_pods_synced_with_duplicated() -> Vec<core::Pod> {
    vec![
        pod(
            "duplicated-v1-12345-dbdtr",
            json!({ "app": "duplicated", "version": "v1" }),
            json!([owner("apps/v1", "ReplicaSet", "duplicated-v1-12345")]),
            Some(true),
        ),
        pod(
            "duplicated-v1-0",
            json!({ "app": "duplicated", "version": "v1" }),
            json!([owner("apps/v1", "StatefulSet", "duplicated-v1")]),
            Some(false),
        ),
    ]
}

pub fn fake_deployment_with_annotations() -> Deployment {
    from_json(json!({
        "metadata": {
            "name": "reviews-v1",
            "creationTimestamp": CREATED,
            "annotations": {
                "kiali.io/api-spec": "https://example.com/openapi.json",
                "kiali.io/api-type": "rest"
            }
        },
        "spec": {
            "replicas": 2,
            "selector": {},
            "template": {
                "metadata": {
                    "labels": { "app": "reviews", "version": "v1" },
                    "annotations": { "kiali.io/runtimes": "Go, Envoy" }
                }
            }
        },
        "status": { "replicas": 2, "availableReplicas": 1 }
    }))
}

pub fn fake_cron_job(name: &str) -> CronJob {
    from_json(json!({
        "metadata": { "name": name, "creationTimestamp": CREATED },
        "spec": {
            "schedule": "0 0 * * *",
            "jobTemplate": {
                "spec": { "template": template(json!({ "app": name })) }
            }
        }
    }))
}

pub fn fake_job_owned_by_cron_job(name: &str, cron_job: &str) -> Job {
    from_json(json!({
        "metadata": {
            "name": name,
            "creationTimestamp": CREATED,
            "ownerReferences": [owner("batch/v1", "CronJob", cron_job)]
        },
        "spec": { "template": template(json!({ "app": cron_job })) },
        "status": { "active": 1 }
    }))
}

pub fn fake_pod_owned_by(name: &str, api_version: &str, kind: &str, owner_name: &str) -> core::Pod {
    pod(
        name,
        json!({ "app": owner_name }),
        json!([owner(api_version, kind, owner_name)]),
        Some(true),
    )
}

/// Bookinfo-like namespace: a details Deployment with one pod and a service
pub fn fake_details_service() -> Service {
    from_json(json!({
        "metadata": {
            "name": "details",
            "namespace": "bookinfo",
            "labels": { "app": "details" }
        },
        "spec": { "selector": { "app": "details" } }
    }))
}

pub fn fake_reviews_service() -> Service {
    from_json(json!({
        "metadata": {
            "name": "reviews",
            "namespace": "bookinfo",
            "labels": { "app": "reviews" }
        },
        "spec": { "selector": { "app": "reviews" } }
    }))
}
