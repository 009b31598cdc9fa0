//! Kubernetes API server version fetcher

use std::sync::Arc;

use async_trait::async_trait;

use crate::kubernetes::K8sClient;
use crate::status::error::StatusError;
use crate::status::fetcher::VersionFetcher;
use crate::status::types::ExternalServiceInfo;

pub struct KubernetesFetcher {
    client: Arc<dyn K8sClient>,
}

impl KubernetesFetcher {
    pub fn new(client: Arc<dyn K8sClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VersionFetcher for KubernetesFetcher {
    fn component(&self) -> &'static str {
        "kubernetes"
    }

    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError> {
        let version = self.client.get_server_version().await?;
        Ok(ExternalServiceInfo::new("Kubernetes").with_version(version))
    }
}
