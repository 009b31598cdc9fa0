//! Components reported by name and URL only

use async_trait::async_trait;

use crate::status::error::StatusError;
use crate::status::fetcher::VersionFetcher;
use crate::status::types::ExternalServiceInfo;

/// Grafana is linked to, never queried
pub struct GrafanaFetcher {
    url: String,
}

impl GrafanaFetcher {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl VersionFetcher for GrafanaFetcher {
    fn component(&self) -> &'static str {
        "grafana"
    }

    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError> {
        Ok(ExternalServiceInfo::new("Grafana").with_url(self.url.clone()))
    }
}

/// The tracing backend is reported as Jaeger
pub struct TracingFetcher {
    url: String,
}

impl TracingFetcher {
    pub fn new(url: String) -> Self {
        Self { url }
    }
}

#[async_trait]
impl VersionFetcher for TracingFetcher {
    fn component(&self) -> &'static str {
        "tracing"
    }

    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError> {
        Ok(ExternalServiceInfo::new("Jaeger").with_url(self.url.clone()))
    }
}
