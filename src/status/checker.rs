//! Status aggregation over all version fetchers

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::kubernetes::K8sClient;
use crate::status::compatibility::CompatibilityMatrix;
use crate::status::error::StatusError;
use crate::status::fetcher::VersionFetcher;
use crate::status::fetchers::{
    GrafanaFetcher, IstioFetcher, KubernetesFetcher, PrometheusFetcher, TracingFetcher,
};
use crate::status::store::{CORE_COMMIT_HASH, CORE_VERSION, StatusInfo, StatusStore};
use crate::status::types::{ExternalServiceInfo, MeshProductName};

/// Outcome of the startup mesh compatibility check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshCheck {
    Supported(ExternalServiceInfo),
    /// The mesh answered with a version no classifier recognized
    Unrecognized(String),
    /// Unreachable, failing or incompatible; carries the reason
    Failed(String),
}

pub struct StatusChecker {
    store: Arc<StatusStore>,
    mesh: Arc<dyn VersionFetcher>,
    others: Vec<Arc<dyn VersionFetcher>>,
}

impl StatusChecker {
    /// Builds the fetchers enabled by `config` and seeds the store with the
    /// core version and commit hash
    pub fn new(
        config: &Config,
        client: Arc<dyn K8sClient>,
        store: Arc<StatusStore>,
    ) -> Result<Self, StatusError> {
        let services = &config.external_services;
        let matrix = Arc::new(CompatibilityMatrix::embedded()?);

        let mesh: Arc<dyn VersionFetcher> = Arc::new(IstioFetcher::new(
            services.istio.url_service_version.clone(),
            matrix,
            store.clone(),
        ));

        let mut others: Vec<Arc<dyn VersionFetcher>> = vec![
            Arc::new(PrometheusFetcher::new(
                services.prometheus.clone(),
                config.kubernetes_config.service_account_token_path.clone(),
            )),
            Arc::new(KubernetesFetcher::new(client)),
        ];

        if services.grafana.enabled {
            others.push(Arc::new(GrafanaFetcher::new(services.grafana.url.clone())));
        } else {
            debug!("Grafana is disabled by configuration");
        }

        if services.tracing.enabled {
            others.push(Arc::new(TracingFetcher::new(services.tracing.url.clone())));
        } else {
            debug!("Jaeger is disabled by configuration");
        }

        store.put(CORE_VERSION, config.core_version.clone());
        store.put(CORE_COMMIT_HASH, config.core_commit_hash.clone());

        Ok(Self::with_fetchers(store, mesh, others))
    }

    pub fn with_fetchers(
        store: Arc<StatusStore>,
        mesh: Arc<dyn VersionFetcher>,
        others: Vec<Arc<dyn VersionFetcher>>,
    ) -> Self {
        Self {
            store,
            mesh,
            others,
        }
    }

    /// Queries every component and records the reachable ones as external
    /// services, in fetcher order. Failures are skipped.
    pub async fn get_versions(&self) -> Vec<ExternalServiceInfo> {
        let fetchers: Vec<&Arc<dyn VersionFetcher>> =
            std::iter::once(&self.mesh).chain(self.others.iter()).collect();

        let results = join_all(fetchers.iter().map(|fetcher| fetcher.fetch())).await;

        let services: Vec<ExternalServiceInfo> = fetchers
            .iter()
            .zip(results)
            .filter_map(|(fetcher, result)| match result {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!("Failed to get {} version: {}", fetcher.component(), e);
                    None
                }
            })
            .collect();

        self.store.set_external_services(services.clone());
        services
    }

    /// Refreshes the external services and returns the full status
    pub async fn status(&self) -> StatusInfo {
        self.get_versions().await;
        self.store.snapshot()
    }

    /// Runs the mesh compatibility check once at startup and logs its outcome
    pub async fn check_version_compatibility(&self) -> MeshCheck {
        match self.mesh.fetch().await {
            Err(e) => {
                warn!("{}", e);
                MeshCheck::Failed(e.to_string())
            }
            Ok(info) if info.name == MeshProductName::Unknown.as_str() => {
                warn!(
                    "Unknown Istio implementation version {} is not recognized, thus not supported.",
                    info.version
                );
                MeshCheck::Unrecognized(info.version)
            }
            Ok(info) => {
                info!("Mesh Name: [{}], Mesh Version: [{}]", info.name, info.version);
                MeshCheck::Supported(info)
            }
        }
    }
}
