//! Mesh control plane version fetcher

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::HTTP_TIMEOUT;
use crate::status::classifier::RawVersionClassifier;
use crate::status::compatibility::CompatibilityMatrix;
use crate::status::error::StatusError;
use crate::status::fetcher::VersionFetcher;
use crate::status::store::{CORE_VERSION, MESH_NAME, MESH_VERSION, StatusStore};
use crate::status::types::ExternalServiceInfo;

const UNREACHABLE_WARNING: &str =
    "failed to get mesh version, please check if url_service_version is configured correctly.";

/// Reads the raw version string exposed by the control plane, classifies it
/// and checks it against the compatibility matrix.
pub struct IstioFetcher {
    client: Client,
    url: String,
    classifier: RawVersionClassifier,
    matrix: Arc<CompatibilityMatrix>,
    store: Arc<StatusStore>,
}

impl IstioFetcher {
    pub fn new(url: String, matrix: Arc<CompatibilityMatrix>, store: Arc<StatusStore>) -> Self {
        Self {
            client: Client::new(),
            url,
            classifier: RawVersionClassifier::new(),
            matrix,
            store,
        }
    }
}

#[async_trait]
impl VersionFetcher for IstioFetcher {
    fn component(&self) -> &'static str {
        "istio"
    }

    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError> {
        debug!("Fetching mesh version: {}", self.url);

        let response = match self.client.get(&self.url).timeout(HTTP_TIMEOUT).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Mesh version request failed: {}", e);
                self.store.add_warning(UNREACHABLE_WARNING);
                return Err(StatusError::Unreachable(UNREACHABLE_WARNING.to_string()));
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(StatusError::HttpStatus {
                component: "istio",
                code: status.as_u16(),
            });
        }

        let raw_version = response.text().await?;
        let product = self.classifier.classify(raw_version.trim());
        let core_version = self.store.get(CORE_VERSION).unwrap_or_default();

        self.store.put(MESH_VERSION, product.version.clone());
        self.store.put(MESH_NAME, product.name.as_str());

        if !self
            .matrix
            .check_mesh_version(product.name, &product.version, &core_version)
        {
            let warning = format!(
                "Kiali [{}] may not be compatible with [{} {}], and is not recommended. See kiali.io for version compatibility",
                core_version, product.name, product.version
            );
            self.store.add_warning(warning.clone());
            return Err(StatusError::Incompatible(warning));
        }

        Ok(product.into_service_info())
    }
}
