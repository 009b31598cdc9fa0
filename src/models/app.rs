use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::health::AppHealth;
use crate::models::namespace::Namespace;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppListItem {
    pub name: String,
    pub istio_sidecar: bool,
    /// Labels of all the app's workloads; conflicting values are joined with ","
    pub labels: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<AppHealth>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppList {
    pub namespace: Namespace,
    pub applications: Vec<AppListItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppWorkload {
    pub workload_name: String,
    pub istio_sidecar: bool,
    pub labels: BTreeMap<String, String>,
    pub service_account_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub namespace: Namespace,
    pub name: String,
    pub workloads: Vec<AppWorkload>,
    pub service_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<AppHealth>,
}
