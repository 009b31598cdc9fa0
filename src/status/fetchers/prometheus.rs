//! Prometheus version fetcher

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::{HTTP_TIMEOUT, PrometheusConfig};
use crate::prometheus::auth::Credentials;
use crate::status::error::StatusError;
use crate::status::fetcher::VersionFetcher;
use crate::status::types::ExternalServiceInfo;

pub struct PrometheusFetcher {
    client: Client,
    config: PrometheusConfig,
    token_path: PathBuf,
}

impl PrometheusFetcher {
    pub fn new(config: PrometheusConfig, token_path: PathBuf) -> Self {
        Self {
            client: Client::new(),
            config,
            token_path,
        }
    }
}

/// Body of Prometheus' `/version` endpoint
#[derive(Debug, Deserialize)]
struct PrometheusVersion {
    version: String,
}

#[async_trait]
impl VersionFetcher for PrometheusFetcher {
    fn component(&self) -> &'static str {
        "prometheus"
    }

    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError> {
        let credentials = Credentials::resolve(&self.config.auth, &self.token_path)
            .inspect_err(|e| error!("Could not read the service account token: {}", e))?;

        let url = format!("{}/version", self.config.url.trim_end_matches('/'));
        debug!("Fetching Prometheus version: {}", url);

        let request = self.client.get(&url).timeout(HTTP_TIMEOUT);
        let response = credentials.apply(request).send().await?;

        if !response.status().is_success() {
            return Err(StatusError::HttpStatus {
                component: "prometheus",
                code: response.status().as_u16(),
            });
        }

        let body: PrometheusVersion = response
            .json()
            .await
            .map_err(|e| StatusError::InvalidResponse(e.to_string()))?;

        Ok(ExternalServiceInfo::new("Prometheus").with_version(body.version))
    }
}
