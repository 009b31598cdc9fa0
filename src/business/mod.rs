//! Business layer between the HTTP handlers and the cluster
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────┐
//! │  AppService  │────▶│ WorkloadService│────▶│  K8sClient   │
//! └──────────────┘     │ (reconciling)  │     └──────────────┘
//!        │             └────────────────┘
//!        │                     │
//!        ▼                     ▼
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────┐
//! │HealthService │────▶│ MetricsClient  │◀────│  Dashboards  │
//! └──────────────┘     └────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`apps`]: workloads grouped by app label
//! - [`controllers`]: folding controllers and pods into workloads
//! - [`dashboards`]: Istio metrics charts
//! - [`health`]: replica status and request rates
//! - [`logs`]: pod log parsing
//! - [`namespaces`]: namespace lookup and rate interval adjustment
//! - [`workloads`]: workload listing, details, pods and logs

pub mod apps;
pub mod controllers;
pub mod dashboards;
pub mod error;
pub mod health;
pub mod logs;
pub mod namespaces;
pub mod workloads;

#[cfg(test)]
pub(crate) mod fixtures;

use std::sync::Arc;

use crate::config::Config;
use crate::kubernetes::K8sClient;
use crate::prometheus::MetricsClient;

pub use apps::{AppCriteria, AppService};
pub use dashboards::{DashboardQuery, DashboardService, Direction, ObjectType};
pub use error::BusinessError;
pub use health::HealthService;
pub use logs::LogOptions;
pub use namespaces::NamespaceService;
pub use workloads::{WorkloadCriteria, WorkloadService};

/// Every business service, sharing one set of clients
#[derive(Clone)]
pub struct Layer {
    pub namespaces: NamespaceService,
    pub workloads: WorkloadService,
    pub apps: AppService,
    pub dashboards: DashboardService,
}

impl Layer {
    pub fn new(
        k8s: Arc<dyn K8sClient>,
        metrics: Arc<dyn MetricsClient>,
        config: Arc<Config>,
    ) -> Self {
        let namespaces = NamespaceService::new(k8s.clone());
        let health = HealthService::new(metrics.clone());
        let workloads = WorkloadService::new(
            k8s.clone(),
            config.clone(),
            namespaces.clone(),
            health.clone(),
        );
        let apps = AppService::new(k8s, config, workloads.clone(), health);

        Self {
            namespaces,
            workloads,
            apps,
            dashboards: DashboardService::new(metrics),
        }
    }
}
