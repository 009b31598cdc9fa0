//! Apps are the workloads of a namespace grouped by their app label

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::debug;

use crate::business::error::BusinessError;
use crate::business::health::{HealthService, HealthTarget, workload_status};
use crate::business::namespaces::adjust_rate_interval;
use crate::business::workloads::WorkloadService;
use crate::config::{Config, DEFAULT_RATE_INTERVAL};
use crate::kubernetes::K8sClient;
use crate::models::{
    App, AppHealth, AppList, AppListItem, AppWorkload, Namespace, ServiceOverview, Workload,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AppCriteria {
    pub namespace: String,
    pub app_name: String,
    pub include_health: bool,
    pub rate_interval: String,
    pub query_time: DateTime<Utc>,
}

impl AppCriteria {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            app_name: String::new(),
            include_health: false,
            rate_interval: DEFAULT_RATE_INTERVAL.to_string(),
            query_time: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct AppService {
    k8s: Arc<dyn K8sClient>,
    config: Arc<Config>,
    workloads: WorkloadService,
    health: HealthService,
}

/// Union of the labels of several workloads; a key with different values
/// keeps them all, comma separated, in first-seen order
fn merge_labels<'a>(workloads: impl IntoIterator<Item = &'a Workload>) -> BTreeMap<String, String> {
    let mut values: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for workload in workloads {
        for (key, value) in &workload.labels {
            let seen = values.entry(key.as_str()).or_default();
            if !seen.contains(&value.as_str()) {
                seen.push(value.as_str());
            }
        }
    }
    values
        .into_iter()
        .map(|(key, seen)| (key.to_string(), seen.join(",")))
        .collect()
}

impl AppService {
    pub fn new(
        k8s: Arc<dyn K8sClient>,
        config: Arc<Config>,
        workloads: WorkloadService,
        health: HealthService,
    ) -> Self {
        Self {
            k8s,
            config,
            workloads,
            health,
        }
    }

    fn group_by_app(&self, workloads: Vec<Workload>) -> IndexMap<String, Vec<Workload>> {
        let app_label = &self.config.istio_labels.app_label_name;
        let mut apps: IndexMap<String, Vec<Workload>> = IndexMap::new();
        for workload in workloads {
            let Some(app) = workload.app(app_label).map(str::to_string) else {
                continue;
            };
            apps.entry(app).or_default().push(workload);
        }
        apps.sort_keys();
        apps
    }

    async fn app_health(
        &self,
        namespace: &Namespace,
        rate_interval: &str,
        query_time: DateTime<Utc>,
    ) -> Result<IndexMap<String, AppHealth>, BusinessError> {
        let rate_interval = adjust_rate_interval(namespace, rate_interval, query_time)?;
        let requests = self
            .health
            .namespace_request_health(&namespace.name, HealthTarget::App, &rate_interval, query_time)
            .await?;

        Ok(requests
            .into_iter()
            .map(|(app, requests)| {
                (
                    app,
                    AppHealth {
                        workload_statuses: Vec::new(),
                        requests,
                    },
                )
            })
            .collect())
    }

    pub async fn get_app_list(&self, criteria: &AppCriteria) -> Result<AppList, BusinessError> {
        let (namespace, workloads) = self.workloads.fetch_workloads(&criteria.namespace).await?;
        let apps = self.group_by_app(workloads);
        debug!("Namespace {} has {} apps", criteria.namespace, apps.len());

        let mut health = if criteria.include_health {
            self.app_health(&namespace, &criteria.rate_interval, criteria.query_time)
                .await?
        } else {
            IndexMap::new()
        };

        let applications = apps
            .iter()
            .map(|(name, workloads)| AppListItem {
                name: name.clone(),
                istio_sidecar: workloads.iter().all(|w| w.istio_sidecar),
                labels: merge_labels(workloads),
                health: criteria.include_health.then(|| {
                    let mut app_health = health.shift_remove(name).unwrap_or_default();
                    app_health.workload_statuses = workloads.iter().map(workload_status).collect();
                    app_health
                }),
            })
            .collect();

        Ok(AppList {
            namespace,
            applications,
        })
    }

    pub async fn get_app_details(&self, criteria: &AppCriteria) -> Result<App, BusinessError> {
        let (namespace, workloads) = self.workloads.fetch_workloads(&criteria.namespace).await?;
        let mut apps = self.group_by_app(workloads);
        let Some(workloads) = apps.shift_remove(&criteria.app_name) else {
            return Err(BusinessError::NotFound(format!(
                "App {} not found in namespace {}",
                criteria.app_name, criteria.namespace
            )));
        };

        let services = self.k8s.get_services(&criteria.namespace).await?;
        let mut service_names: Vec<String> = services
            .iter()
            .map(ServiceOverview::from_k8s)
            .filter(|service| workloads.iter().any(|w| service.selects(&w.labels)))
            .map(|service| service.name)
            .collect();
        service_names.sort();
        service_names.dedup();

        let health = if criteria.include_health {
            let mut health = self
                .app_health(&namespace, &criteria.rate_interval, criteria.query_time)
                .await?;
            let mut app_health = health.shift_remove(&criteria.app_name).unwrap_or_default();
            app_health.workload_statuses = workloads.iter().map(workload_status).collect();
            Some(app_health)
        } else {
            None
        };

        Ok(App {
            name: criteria.app_name.clone(),
            workloads: workloads
                .iter()
                .map(|w| AppWorkload {
                    workload_name: w.name.clone(),
                    istio_sidecar: w.istio_sidecar,
                    labels: w.labels.clone(),
                    service_account_names: w.service_account_names(),
                })
                .collect(),
            service_names,
            health,
            namespace,
        })
    }
}
