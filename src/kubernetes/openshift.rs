//! OpenShift resources that are not part of k8s-openapi

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::PodTemplateSpec;
use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// `apps.openshift.io/v1` DeploymentConfig, only the fields workloads read
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    plural = "deploymentconfigs",
    namespaced,
    status = "DeploymentConfigStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    pub replicas: Option<i32>,
    pub selector: Option<BTreeMap<String, String>>,
    pub template: Option<PodTemplateSpec>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    pub replicas: Option<i32>,
    pub available_replicas: Option<i32>,
    pub updated_replicas: Option<i32>,
}
