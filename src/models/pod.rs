use std::collections::BTreeMap;

use k8s_openapi::api::core::v1 as core;
use serde::Serialize;

use crate::config::IstioLabels;
use crate::models::time::format_time;

pub const ISTIO_PROXY_CONTAINER: &str = "istio-proxy";
const ISTIO_INIT_CONTAINERS: [&str; 2] = ["istio-init", "istio-validation"];

/// Owner of a pod, as recorded in its controller owner reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInfo {
    pub name: String,
    pub image: String,
    pub is_proxy: bool,
    pub is_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub created_at: String,
    pub created_by: Vec<Reference>,
    pub containers: Vec<ContainerInfo>,
    pub istio_containers: Vec<ContainerInfo>,
    pub istio_init_containers: Vec<ContainerInfo>,
    pub status: String,
    pub status_message: String,
    pub status_reason: String,
    pub app_label: bool,
    pub version_label: bool,
    pub service_account_name: String,
}

impl Pod {
    pub fn from_k8s(pod: &core::Pod, istio_labels: &IstioLabels) -> Self {
        let labels = pod.metadata.labels.clone().unwrap_or_default();
        let created_by = pod
            .metadata
            .owner_references
            .iter()
            .flatten()
            .filter(|owner| owner.controller.unwrap_or(false))
            .map(|owner| Reference {
                name: owner.name.clone(),
                kind: owner.kind.clone(),
            })
            .collect();

        let ready: BTreeMap<&str, bool> = pod
            .status
            .iter()
            .flat_map(|status| status.container_statuses.iter().flatten())
            .map(|status| (status.name.as_str(), status.ready))
            .collect();

        let spec = pod.spec.as_ref();
        let (istio_containers, containers): (Vec<ContainerInfo>, Vec<ContainerInfo>) = spec
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|c| container_info(c, &ready))
            .partition(|c| c.is_proxy);

        let istio_init_containers = spec
            .and_then(|spec| spec.init_containers.as_deref())
            .unwrap_or_default()
            .iter()
            .filter(|c| ISTIO_INIT_CONTAINERS.contains(&c.name.as_str()))
            .map(|c| container_info(c, &ready))
            .collect();

        let status = pod.status.as_ref();
        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            app_label: labels.contains_key(&istio_labels.app_label_name),
            version_label: labels.contains_key(&istio_labels.version_label_name),
            labels,
            created_at: format_time(pod.metadata.creation_timestamp.as_ref()),
            created_by,
            containers,
            istio_containers,
            istio_init_containers,
            status: status
                .and_then(|s| s.phase.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            status_message: status.and_then(|s| s.message.clone()).unwrap_or_default(),
            status_reason: status.and_then(|s| s.reason.clone()).unwrap_or_default(),
            service_account_name: spec
                .and_then(|spec| spec.service_account_name.clone())
                .unwrap_or_default(),
        }
    }

    pub fn has_istio_sidecar(&self) -> bool {
        !self.istio_containers.is_empty()
    }

    /// True when every sidecar container of the pod reports ready
    pub fn proxy_ready(&self) -> bool {
        self.has_istio_sidecar() && self.istio_containers.iter().all(|c| c.is_ready)
    }
}

fn container_info(container: &core::Container, ready: &BTreeMap<&str, bool>) -> ContainerInfo {
    ContainerInfo {
        name: container.name.clone(),
        image: container.image.clone().unwrap_or_default(),
        is_proxy: container.name == ISTIO_PROXY_CONTAINER,
        is_ready: ready.get(container.name.as_str()).copied().unwrap_or(false),
    }
}
