//! Process-wide status values, warnings and external services

use std::sync::RwLock;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::status::types::ExternalServiceInfo;

pub const CORE_VERSION: &str = "Kiali core version";
pub const CORE_COMMIT_HASH: &str = "Kiali core commit hash";
pub const MESH_NAME: &str = "Mesh name";
pub const MESH_VERSION: &str = "Mesh version";

/// Serializable snapshot of the status store
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    pub status: IndexMap<String, String>,
    pub external_services: Vec<ExternalServiceInfo>,
    pub warning_messages: Vec<String>,
}

#[derive(Debug, Default)]
struct StatusState {
    status: IndexMap<String, String>,
    warnings: IndexSet<String>,
    external_services: Vec<ExternalServiceInfo>,
}

/// Shared status written by the version fetchers and read by the status API
#[derive(Debug, Default)]
pub struct StatusStore {
    state: RwLock<StatusState>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.status.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        state.status.get(key).cloned()
    }

    /// Records a warning; a message already present is kept only once
    pub fn add_warning(&self, message: impl Into<String>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.warnings.insert(message.into());
    }

    pub fn set_external_services(&self, services: Vec<ExternalServiceInfo>) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.external_services = services;
    }

    pub fn snapshot(&self) -> StatusInfo {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        StatusInfo {
            status: state.status.clone(),
            external_services: state.external_services.clone(),
            warning_messages: state.warnings.iter().cloned().collect(),
        }
    }
}
