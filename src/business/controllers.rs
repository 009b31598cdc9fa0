//! Workload reconciliation
//!
//! Pods, controllers and owner references are folded into one workload per
//! top-level owner:
//!
//! 1. every pod's controller registers `owner name -> kind`; bare pods
//!    register themselves
//! 2. ReplicaSets, ReplicationControllers and Jobs owned by a known
//!    controller collapse into that owner
//! 3. controllers without pods are registered too
//! 4. each registered name becomes a workload, built from its listing and
//!    the pods whose top-level owner has that same name and kind
//!
//! Names are unique in the result. When several kinds claim one name the
//! kind with the highest [`WorkloadKind::priority`] wins.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use kube::Resource;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::{self as core, PodTemplateSpec, ReplicationController};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use tracing::{debug, error};

use crate::config::Config;
use crate::kubernetes::openshift::DeploymentConfig;
use crate::models::time::format_time;
use crate::models::workload::{AdditionalItem, Runtime};
use crate::models::{Pod, Workload, WorkloadKind};

const RUNTIMES_ANNOTATION: &str = "kiali.io/runtimes";
const API_SPEC_ANNOTATION: &str = "kiali.io/api-spec";
const API_TYPE_ANNOTATION: &str = "kiali.io/api-type";

/// Everything listed in one namespace
#[derive(Debug, Clone, Default)]
pub struct Listings {
    pub namespace: String,
    pub pods: Vec<core::Pod>,
    pub deployments: Vec<Deployment>,
    pub deployment_configs: Vec<DeploymentConfig>,
    pub replica_sets: Vec<ReplicaSet>,
    pub replication_controllers: Vec<ReplicationController>,
    pub stateful_sets: Vec<StatefulSet>,
    pub daemon_sets: Vec<DaemonSet>,
    pub jobs: Vec<Job>,
    pub cron_jobs: Vec<CronJob>,
}

fn controller_of(meta: &ObjectMeta) -> Option<&OwnerReference> {
    meta.owner_references
        .iter()
        .flatten()
        .find(|owner| owner.controller.unwrap_or(false))
}

fn name_of(meta: &ObjectMeta) -> &str {
    meta.name.as_deref().unwrap_or_default()
}

fn find_by_name<'a, K: Resource>(items: &'a [K], name: &str) -> Option<&'a K> {
    items.iter().find(|item| name_of(item.meta()) == name)
}

/// Workload name with the kind of the controller behind it
type WorkloadKey = (String, WorkloadKind);

/// Registered workload names and the kind each one resolved to
#[derive(Debug, Default)]
struct Registry {
    kinds: IndexMap<String, WorkloadKind>,
    /// child controller -> owner it collapsed into
    aliases: HashMap<WorkloadKey, WorkloadKey>,
}

impl Registry {
    fn register(&mut self, name: &str, kind: WorkloadKind) {
        match self.kinds.get(name) {
            Some(existing) if existing.priority() >= kind.priority() => {}
            Some(existing) => {
                debug!(
                    "Workload {} claimed by {} and {}, keeping {}",
                    name, existing, kind, kind
                );
                self.kinds.insert(name.to_string(), kind);
            }
            None => {
                self.kinds.insert(name.to_string(), kind);
            }
        }
    }

    /// Collapses `child` into its controller when that controller is a
    /// known workload kind
    fn collapse(
        &mut self,
        child: &str,
        child_kind: &WorkloadKind,
        owner: Option<&OwnerReference>,
    ) {
        let Some(owner) = owner else {
            return;
        };
        let owner_kind = WorkloadKind::from(owner.kind.as_str());
        if !owner_kind.is_known() {
            return;
        }
        self.kinds.shift_remove(child);
        self.aliases.insert(
            (child.to_string(), child_kind.clone()),
            (owner.name.clone(), owner_kind.clone()),
        );
        self.register(&owner.name, owner_kind);
    }

    /// Workload a pod belongs to, keyed by the kind of its top-level owner
    fn workload_of(&self, pod: &core::Pod) -> WorkloadKey {
        match controller_of(&pod.metadata) {
            Some(owner) => {
                let key = (owner.name.clone(), WorkloadKind::from(owner.kind.as_str()));
                self.aliases.get(&key).cloned().unwrap_or(key)
            }
            None => (name_of(&pod.metadata).to_string(), WorkloadKind::Pod),
        }
    }
}

/// Controller fields shared by every workload kind
#[derive(Debug, Clone, Default)]
struct ControllerInfo {
    created_at: String,
    resource_version: String,
    annotations: BTreeMap<String, String>,
    template_labels: BTreeMap<String, String>,
    template_annotations: BTreeMap<String, String>,
    desired: i32,
    current: i32,
    available: i32,
}

impl ControllerInfo {
    fn new(meta: &ObjectMeta, template: Option<&PodTemplateSpec>) -> Self {
        let template_meta = template.and_then(|t| t.metadata.as_ref());
        Self {
            created_at: format_time(meta.creation_timestamp.as_ref()),
            resource_version: meta.resource_version.clone().unwrap_or_default(),
            annotations: meta.annotations.clone().unwrap_or_default(),
            template_labels: template_meta
                .and_then(|m| m.labels.clone())
                .unwrap_or_default(),
            template_annotations: template_meta
                .and_then(|m| m.annotations.clone())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    fn replicas(mut self, desired: i32, current: i32, available: i32) -> Self {
        self.desired = desired;
        self.current = current;
        self.available = available;
        self
    }

    fn from_deployment(d: &Deployment) -> Self {
        let status = d.status.as_ref();
        Self::new(&d.metadata, d.spec.as_ref().map(|s| &s.template)).replicas(
            d.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1),
            status.and_then(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }

    fn from_deployment_config(dc: &DeploymentConfig) -> Self {
        let status = dc.status.as_ref();
        Self::new(&dc.metadata, dc.spec.template.as_ref()).replicas(
            dc.spec.replicas.unwrap_or(1),
            status.and_then(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }

    fn from_replica_set(rs: &ReplicaSet) -> Self {
        let spec = rs.spec.as_ref();
        let status = rs.status.as_ref();
        Self::new(&rs.metadata, spec.and_then(|s| s.template.as_ref())).replicas(
            spec.and_then(|s| s.replicas).unwrap_or(1),
            status.map(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }

    fn from_replication_controller(rc: &ReplicationController) -> Self {
        let spec = rc.spec.as_ref();
        let status = rc.status.as_ref();
        Self::new(&rc.metadata, spec.and_then(|s| s.template.as_ref())).replicas(
            spec.and_then(|s| s.replicas).unwrap_or(1),
            status.map(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }

    fn from_stateful_set(ss: &StatefulSet) -> Self {
        let spec = ss.spec.as_ref();
        let status = ss.status.as_ref();
        Self::new(&ss.metadata, spec.map(|s| &s.template)).replicas(
            spec.and_then(|s| s.replicas).unwrap_or(1),
            status.map(|s| s.replicas).unwrap_or(0),
            status.and_then(|s| s.available_replicas).unwrap_or(0),
        )
    }

    fn from_daemon_set(ds: &DaemonSet) -> Self {
        let status = ds.status.as_ref();
        Self::new(&ds.metadata, ds.spec.as_ref().map(|s| &s.template)).replicas(
            status.map(|s| s.desired_number_scheduled).unwrap_or(0),
            status.map(|s| s.current_number_scheduled).unwrap_or(0),
            status.and_then(|s| s.number_available).unwrap_or(0),
        )
    }

    fn from_job(job: &Job) -> Self {
        let status = job.status.as_ref();
        let active = status.and_then(|s| s.active).unwrap_or(0);
        let succeeded = status.and_then(|s| s.succeeded).unwrap_or(0);
        let failed = status.and_then(|s| s.failed).unwrap_or(0);
        Self::new(&job.metadata, job.spec.as_ref().map(|s| &s.template)).replicas(
            active + succeeded + failed,
            active + succeeded,
            active + succeeded,
        )
    }

    fn from_cron_job(cj: &CronJob) -> Self {
        let template = cj
            .spec
            .as_ref()
            .and_then(|s| s.job_template.spec.as_ref())
            .map(|s| &s.template);
        let active = cj
            .status
            .as_ref()
            .and_then(|s| s.active.as_ref())
            .map(|a| a.len() as i32)
            .unwrap_or(0);
        Self::new(&cj.metadata, template).replicas(active, active, active)
    }

    fn from_pod(pod: &core::Pod) -> Self {
        let mut info = Self::new(&pod.metadata, None);
        info.template_labels = pod.metadata.labels.clone().unwrap_or_default();
        info.template_annotations = pod.metadata.annotations.clone().unwrap_or_default();
        let running = is_running(pod) as i32;
        info.replicas(1, 1, running)
    }

    /// Generic controller only known through the pods it owns
    fn from_owned_pods(pods: &[&core::Pod]) -> Option<Self> {
        let first = pods.first()?;
        let running = pods.iter().filter(|pod| is_running(pod)).count() as i32;
        let mut info = Self::from_pod(first);
        info.annotations = BTreeMap::new();
        Some(info.replicas(pods.len() as i32, pods.len() as i32, running))
    }
}

fn is_running(pod: &core::Pod) -> bool {
    matches!(
        pod.status.as_ref().and_then(|s| s.phase.as_deref()),
        Some("Running") | Some("Succeeded")
    )
}

/// Folds the listings into workloads, sorted by name
pub struct Reconciler<'a> {
    listings: &'a Listings,
    config: &'a Config,
    registry: Registry,
}

impl<'a> Reconciler<'a> {
    pub fn new(listings: &'a Listings, config: &'a Config) -> Self {
        let mut reconciler = Self {
            listings,
            config,
            registry: Registry::default(),
        };
        reconciler.register_pod_owners();
        reconciler.collapse_children();
        reconciler.register_controllers();
        reconciler
    }

    fn register_pod_owners(&mut self) {
        for pod in &self.listings.pods {
            match controller_of(&pod.metadata) {
                Some(owner) => self
                    .registry
                    .register(&owner.name, WorkloadKind::from(owner.kind.as_str())),
                None => self
                    .registry
                    .register(name_of(&pod.metadata), WorkloadKind::Pod),
            }
        }
    }

    fn collapse_children(&mut self) {
        let candidates: Vec<(String, WorkloadKind)> = self
            .registry
            .kinds
            .iter()
            .map(|(name, kind)| (name.clone(), kind.clone()))
            .collect();
        let l = self.listings;

        for (name, kind) in candidates {
            let owner = match kind {
                WorkloadKind::ReplicaSet => {
                    find_by_name(&l.replica_sets, &name)
                        .and_then(|rs| controller_of(&rs.metadata))
                }
                WorkloadKind::ReplicationController => {
                    find_by_name(&l.replication_controllers, &name)
                        .and_then(|rc| controller_of(&rc.metadata))
                }
                WorkloadKind::Job => {
                    find_by_name(&l.jobs, &name)
                        .and_then(|job| controller_of(&job.metadata))
                }
                _ => None,
            };
            self.registry.collapse(&name, &kind, owner);
        }
    }

    fn register_controllers(&mut self) {
        let l = self.listings;
        let registry = &mut self.registry;

        for d in &l.deployments {
            registry.register(name_of(&d.metadata), WorkloadKind::Deployment);
        }
        for dc in &l.deployment_configs {
            registry.register(name_of(&dc.metadata), WorkloadKind::DeploymentConfig);
        }
        for rs in l.replica_sets.iter().filter(|rs| controller_of(&rs.metadata).is_none()) {
            registry.register(name_of(&rs.metadata), WorkloadKind::ReplicaSet);
        }
        for rc in l
            .replication_controllers
            .iter()
            .filter(|rc| controller_of(&rc.metadata).is_none())
        {
            registry.register(name_of(&rc.metadata), WorkloadKind::ReplicationController);
        }
        for ss in &l.stateful_sets {
            registry.register(name_of(&ss.metadata), WorkloadKind::StatefulSet);
        }
        for ds in &l.daemon_sets {
            registry.register(name_of(&ds.metadata), WorkloadKind::DaemonSet);
        }
        for cj in &l.cron_jobs {
            registry.register(name_of(&cj.metadata), WorkloadKind::CronJob);
        }
        for job in l.jobs.iter().filter(|job| controller_of(&job.metadata).is_none()) {
            registry.register(name_of(&job.metadata), WorkloadKind::Job);
        }
    }

    fn pods_by_workload(&self) -> HashMap<WorkloadKey, Vec<&'a core::Pod>> {
        let mut grouped: HashMap<WorkloadKey, Vec<&core::Pod>> = HashMap::new();
        for pod in &self.listings.pods {
            grouped
                .entry(self.registry.workload_of(pod))
                .or_default()
                .push(pod);
        }
        grouped
    }

    fn controller_info(&self, name: &str, kind: &WorkloadKind, pods: &[&core::Pod]) -> Option<ControllerInfo> {
        let l = self.listings;
        match kind {
            WorkloadKind::Deployment => find_by_name(&l.deployments, name)
                .map(ControllerInfo::from_deployment),
            WorkloadKind::DeploymentConfig => {
                find_by_name(&l.deployment_configs, name)
                    .map(ControllerInfo::from_deployment_config)
            }
            WorkloadKind::ReplicaSet => find_by_name(&l.replica_sets, name)
                .map(ControllerInfo::from_replica_set),
            WorkloadKind::ReplicationController => {
                find_by_name(&l.replication_controllers, name)
                    .map(ControllerInfo::from_replication_controller)
            }
            WorkloadKind::StatefulSet => find_by_name(&l.stateful_sets, name)
                .map(ControllerInfo::from_stateful_set),
            WorkloadKind::DaemonSet => find_by_name(&l.daemon_sets, name)
                .map(ControllerInfo::from_daemon_set),
            WorkloadKind::Job => {
                find_by_name(&l.jobs, name).map(ControllerInfo::from_job)
            }
            WorkloadKind::CronJob => find_by_name(&l.cron_jobs, name)
                .map(ControllerInfo::from_cron_job),
            WorkloadKind::Pod => {
                find_by_name(&l.pods, name).map(ControllerInfo::from_pod)
            }
            WorkloadKind::Custom(_) => ControllerInfo::from_owned_pods(pods),
        }
    }

    fn build(&self, name: &str, kind: &WorkloadKind, pods: &[&core::Pod]) -> Option<Workload> {
        if !self.config.is_workload_included(kind.as_str()) {
            debug!("Workload {} of excluded kind {} skipped", name, kind);
            return None;
        }

        let Some(info) = self.controller_info(name, kind, pods) else {
            error!("Workload {} is not found as {}", name, kind);
            return None;
        };

        let istio_labels = &self.config.istio_labels;
        let pods: Vec<Pod> = pods
            .iter()
            .map(|pod| Pod::from_k8s(pod, istio_labels))
            .collect();

        Some(Workload {
            name: name.to_string(),
            kind: kind.clone(),
            namespace: self.listings.namespace.clone(),
            app_label: info.template_labels.contains_key(&istio_labels.app_label_name),
            version_label: info
                .template_labels
                .contains_key(&istio_labels.version_label_name),
            istio_sidecar: !pods.is_empty() && pods.iter().all(Pod::has_istio_sidecar),
            runtimes: runtimes(&info.template_annotations),
            additional_details: additional_details(&info.annotations),
            labels: info.template_labels,
            created_at: info.created_at,
            resource_version: info.resource_version,
            desired_replicas: info.desired,
            current_replicas: info.current,
            available_replicas: info.available,
            pod_count: pods.len(),
            pods,
            services: None,
            health: None,
        })
    }

    /// All workloads of the namespace, sorted by name
    pub fn workloads(&self) -> Vec<Workload> {
        let grouped = self.pods_by_workload();
        let mut workloads: Vec<Workload> = self
            .registry
            .kinds
            .iter()
            .filter_map(|(name, kind)| {
                let key = (name.clone(), kind.clone());
                let pods = grouped.get(&key).map(Vec::as_slice).unwrap_or_default();
                self.build(name, kind, pods)
            })
            .collect();
        workloads.sort_by(|a, b| a.name.cmp(&b.name));
        workloads
    }

    /// The workload called `name`. A `kind_hint` naming a known controller
    /// kind is preferred over the reconciled kind when that controller exists.
    pub fn workload(&self, name: &str, kind_hint: &str) -> Option<Workload> {
        let reconciled = self.registry.kinds.get(name)?;
        let grouped = self.pods_by_workload();
        let pods_of = |kind: &WorkloadKind| {
            grouped
                .get(&(name.to_string(), kind.clone()))
                .map(Vec::as_slice)
                .unwrap_or_default()
        };

        let hint = WorkloadKind::from(kind_hint);
        if hint.is_known() && hint != *reconciled {
            if let Some(workload) = self.build(name, &hint, pods_of(&hint)) {
                return Some(workload);
            }
        }
        self.build(name, reconciled, pods_of(reconciled))
    }
}

fn runtimes(annotations: &BTreeMap<String, String>) -> Vec<Runtime> {
    annotations
        .get(RUNTIMES_ANNOTATION)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| Runtime {
                    name: name.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn additional_details(annotations: &BTreeMap<String, String>) -> Vec<AdditionalItem> {
    annotations
        .get(API_SPEC_ANNOTATION)
        .map(|value| AdditionalItem {
            title: "API Documentation".to_string(),
            value: value.clone(),
            icon: annotations.get(API_TYPE_ANNOTATION).cloned(),
        })
        .into_iter()
        .collect()
}
