use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1 as core;
use tracing::{debug, error, info};

use crate::business::controllers::{Listings, Reconciler};
use crate::business::error::BusinessError;
use crate::business::health::{HealthService, HealthTarget, workload_status};
use crate::business::logs::{LogOptions, LogParser};
use crate::business::namespaces::{NamespaceService, adjust_rate_interval};
use crate::config::{Config, DEFAULT_RATE_INTERVAL};
use crate::kubernetes::{ClientError, K8sClient, PodLogOptions};
use crate::models::{
    Namespace, Pod, ServiceOverview, Workload, WorkloadHealth, WorkloadKind, WorkloadList,
    WorkloadListItem,
};

/// What to read and what to attach to the result
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadCriteria {
    pub namespace: String,
    pub workload_name: String,
    /// Kind hint, ignored unless it names a known controller kind
    pub workload_type: String,
    pub include_services: bool,
    pub include_health: bool,
    pub rate_interval: String,
    pub query_time: DateTime<Utc>,
}

impl WorkloadCriteria {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            workload_name: String::new(),
            workload_type: String::new(),
            include_services: false,
            include_health: false,
            rate_interval: DEFAULT_RATE_INTERVAL.to_string(),
            query_time: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct WorkloadService {
    k8s: Arc<dyn K8sClient>,
    config: Arc<Config>,
    namespaces: NamespaceService,
    health: HealthService,
    parser: Arc<LogParser>,
}

/// Runs `fetch` only for included kinds
async fn listing<T, F, Fut>(included: bool, fetch: F) -> Result<Vec<T>, BusinessError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, ClientError>>,
{
    if included {
        Ok(fetch().await?)
    } else {
        Ok(Vec::new())
    }
}

impl WorkloadService {
    pub fn new(
        k8s: Arc<dyn K8sClient>,
        config: Arc<Config>,
        namespaces: NamespaceService,
        health: HealthService,
    ) -> Self {
        Self {
            k8s,
            config,
            namespaces,
            health,
            parser: Arc::new(LogParser::new()),
        }
    }

    /// Lists every object workloads are built from. Excluded kinds are not
    /// fetched and DeploymentConfigs only exist on OpenShift.
    async fn fetch_listings(&self, namespace: &str) -> Result<(Namespace, Listings), BusinessError> {
        let k8s = &self.k8s;
        let included = |kind: WorkloadKind| self.config.is_workload_included(kind.as_str());

        let (
            namespace_info,
            pods,
            deployments,
            deployment_configs,
            replica_sets,
            replication_controllers,
            stateful_sets,
            daemon_sets,
            jobs,
            cron_jobs,
        ) = futures::try_join!(
            self.namespaces.get_namespace(namespace),
            listing(true, || k8s.get_pods(namespace, "")),
            listing(included(WorkloadKind::Deployment), || k8s.get_deployments(namespace)),
            listing(
                k8s.is_openshift() && included(WorkloadKind::DeploymentConfig),
                || k8s.get_deployment_configs(namespace),
            ),
            listing(included(WorkloadKind::ReplicaSet), || k8s.get_replica_sets(namespace)),
            listing(included(WorkloadKind::ReplicationController), || {
                k8s.get_replication_controllers(namespace)
            }),
            listing(included(WorkloadKind::StatefulSet), || k8s.get_stateful_sets(namespace)),
            listing(included(WorkloadKind::DaemonSet), || k8s.get_daemon_sets(namespace)),
            listing(included(WorkloadKind::Job), || k8s.get_jobs(namespace)),
            listing(included(WorkloadKind::CronJob), || k8s.get_cron_jobs(namespace)),
        )
        .inspect_err(|e| error!("Failed to list workloads of namespace {}: {}", namespace, e))?;

        Ok((
            namespace_info,
            Listings {
                namespace: namespace.to_string(),
                pods,
                deployments,
                deployment_configs,
                replica_sets,
                replication_controllers,
                stateful_sets,
                daemon_sets,
                jobs,
                cron_jobs,
            },
        ))
    }

    /// All workloads of a namespace, with reconciled kinds and pods
    pub async fn fetch_workloads(&self, namespace: &str) -> Result<(Namespace, Vec<Workload>), BusinessError> {
        let (namespace_info, listings) = self.fetch_listings(namespace).await?;
        let workloads = Reconciler::new(&listings, &self.config).workloads();
        debug!("Namespace {} has {} workloads", namespace, workloads.len());
        Ok((namespace_info, workloads))
    }

    async fn attach_health(
        &self,
        namespace: &Namespace,
        workloads: &mut [Workload],
        criteria: &WorkloadCriteria,
    ) -> Result<(), BusinessError> {
        let rate_interval =
            adjust_rate_interval(namespace, &criteria.rate_interval, criteria.query_time)?;
        let mut requests = self
            .health
            .namespace_request_health(
                &namespace.name,
                HealthTarget::Workload,
                &rate_interval,
                criteria.query_time,
            )
            .await?;

        for workload in workloads.iter_mut() {
            workload.health = Some(WorkloadHealth {
                workload_status: workload_status(workload),
                requests: requests.remove(&workload.name).unwrap_or_default(),
            });
        }
        Ok(())
    }

    pub async fn get_workload_list(
        &self,
        criteria: &WorkloadCriteria,
    ) -> Result<WorkloadList, BusinessError> {
        let (namespace, mut workloads) = self.fetch_workloads(&criteria.namespace).await?;

        if criteria.include_health {
            self.attach_health(&namespace, &mut workloads, criteria).await?;
        }

        Ok(WorkloadList {
            namespace,
            workloads: workloads.iter().map(WorkloadListItem::from).collect(),
        })
    }

    /// One workload with its pods; `None` when no workload has that name
    pub async fn get_workload(
        &self,
        criteria: &WorkloadCriteria,
    ) -> Result<Option<Workload>, BusinessError> {
        let (namespace, listings) = self.fetch_listings(&criteria.namespace).await?;
        let reconciler = Reconciler::new(&listings, &self.config);

        let Some(workload) = reconciler.workload(&criteria.workload_name, &criteria.workload_type)
        else {
            info!(
                "Workload {} not found in namespace {}",
                criteria.workload_name, criteria.namespace
            );
            return Ok(None);
        };
        let mut workloads = [workload];

        if criteria.include_services {
            let services = self.k8s.get_services(&criteria.namespace).await?;
            let [workload] = &mut workloads;
            workload.services = Some(
                services
                    .iter()
                    .map(ServiceOverview::from_k8s)
                    .filter(|service| service.selects(&workload.labels))
                    .collect(),
            );
        }

        if criteria.include_health {
            self.attach_health(&namespace, &mut workloads, criteria).await?;
        }

        let [workload] = workloads;
        Ok(Some(workload))
    }

    pub async fn get_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>, BusinessError> {
        let pods = self.k8s.get_pods(namespace, label_selector).await?;
        Ok(pods
            .iter()
            .map(|pod| Pod::from_k8s(pod, &self.config.istio_labels))
            .collect())
    }

    pub async fn get_pod(&self, namespace: &str, name: &str) -> Result<Pod, BusinessError> {
        let pod: core::Pod = self.k8s.get_pod(namespace, name).await?;
        Ok(Pod::from_k8s(&pod, &self.config.istio_labels))
    }

    /// Reads the logs of a pod container and writes them as a `PodLog`
    /// JSON document
    pub async fn stream_pod_logs<W: Write>(
        &self,
        namespace: &str,
        pod: &str,
        options: &LogOptions,
        writer: W,
    ) -> Result<(), BusinessError> {
        let request = PodLogOptions {
            container: options.container.clone(),
            since_time: options.since_time,
        };
        let logs = self
            .k8s
            .get_pod_logs(namespace, pod, &request)
            .await
            .inspect_err(|e| error!("Failed to read logs of pod {}/{}: {}", namespace, pod, e))?;

        let pod_log = self.parser.parse(&logs, options);
        debug!(
            "Pod {}/{}: {} log entries, truncated: {}",
            namespace,
            pod,
            pod_log.entries.len(),
            pod_log.lines_truncated
        );
        serde_json::to_writer(writer, &pod_log)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::fixtures::*;
    use crate::kubernetes::client::MockK8sClient;
    use crate::models::PodLog;
    use crate::prometheus::client::MockMetricsClient;
    use crate::prometheus::Sample;

    const DETAILS_LOGS: &str = "2018-01-02T03:34:28+00:00 INFO #1 Log Message\n\
        2018-01-02T04:34:28+00:00 WARN #2 Log Message\n\
        2018-01-02T05:34:28+00:00 #3 Log Message\n\
        2018-01-02T06:34:28+00:00 #4 Log error Message";

    /// Client whose listings are empty unless overridden
    fn empty_client() -> MockK8sClient {
        let mut k8s = MockK8sClient::new();
        k8s.expect_is_openshift().return_const(false);
        k8s.expect_get_namespace()
            .returning(|name| Ok(fake_namespace(name)));
        k8s
    }

    fn expect_empty_listings(k8s: &mut MockK8sClient) {
        k8s.expect_get_pods().returning(|_, _| Ok(vec![]));
        k8s.expect_get_deployments().returning(|_| Ok(vec![]));
        k8s.expect_get_replica_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_stateful_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_daemon_sets().returning(|_| Ok(vec![]));
    }

    fn service(k8s: MockK8sClient, metrics: MockMetricsClient, config: Config) -> WorkloadService {
        let k8s: Arc<dyn K8sClient> = Arc::new(k8s);
        WorkloadService::new(
            k8s.clone(),
            Arc::new(config),
            NamespaceService::new(k8s),
            HealthService::new(Arc::new(metrics)),
        )
    }

    fn details_client() -> MockK8sClient {
        let mut k8s = empty_client();
        k8s.expect_get_pods()
            .returning(|_, _| Ok(fake_pods_synced_with_deployments()));
        k8s.expect_get_deployments()
            .returning(|_| Ok(fake_dep_synced_with_rs()));
        k8s.expect_get_replica_sets()
            .returning(|_| Ok(fake_rs_synced_with_pods()));
        k8s.expect_get_stateful_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_daemon_sets().returning(|_| Ok(vec![]));
        k8s
    }

    #[tokio::test]
    async fn workload_list_reports_requested_namespace() {
        let mut k8s = empty_client();
        k8s.expect_get_pods().returning(|_, _| Ok(vec![]));
        k8s.expect_get_deployments()
            .returning(|_| Ok(fake_deployments()));
        k8s.expect_get_replica_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_stateful_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_daemon_sets().returning(|_| Ok(vec![]));
        let service = service(k8s, MockMetricsClient::new(), Config::default());

        let list = service
            .get_workload_list(&WorkloadCriteria::new("Namespace"))
            .await
            .unwrap();

        assert_eq!(list.namespace.name, "Namespace");
        let names: Vec<&str> = list.workloads.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["httpbin-v1", "httpbin-v2", "httpbin-v3"]);
        assert!(list.workloads.iter().all(|w| w.health.is_none()));
    }

    #[tokio::test]
    async fn excluded_kinds_are_not_fetched() {
        let mut k8s = empty_client();
        expect_empty_listings(&mut k8s);
        k8s.expect_get_jobs().never();
        k8s.expect_get_cron_jobs().never();
        k8s.expect_get_replication_controllers().never();
        k8s.expect_get_deployment_configs().never();
        let service = service(k8s, MockMetricsClient::new(), Config::default());

        let list = service
            .get_workload_list(&WorkloadCriteria::new("Namespace"))
            .await
            .unwrap();

        assert!(list.workloads.is_empty());
    }

    #[tokio::test]
    async fn deployment_configs_are_fetched_on_openshift_only() {
        let mut config = Config::default();
        config.kubernetes_config.excluded_workloads.clear();

        let mut k8s = MockK8sClient::new();
        k8s.expect_is_openshift().return_const(true);
        k8s.expect_get_namespace()
            .returning(|name| Ok(fake_namespace(name)));
        expect_empty_listings(&mut k8s);
        k8s.expect_get_jobs().returning(|_| Ok(vec![]));
        k8s.expect_get_cron_jobs().returning(|_| Ok(vec![]));
        k8s.expect_get_replication_controllers()
            .returning(|_| Ok(vec![]));
        k8s.expect_get_deployment_configs()
            .times(1)
            .returning(|_| Ok(fake_deployment_configs()));
        let service = service(k8s, MockMetricsClient::new(), config);

        let list = service
            .get_workload_list(&WorkloadCriteria::new("Namespace"))
            .await
            .unwrap();

        assert_eq!(list.workloads.len(), 3);
        assert!(
            list.workloads
                .iter()
                .all(|w| w.kind == WorkloadKind::DeploymentConfig)
        );
    }

    #[tokio::test]
    async fn listing_errors_propagate() {
        let mut k8s = empty_client();
        k8s.expect_get_pods()
            .returning(|_, _| Err(ClientError::Forbidden("pods is forbidden".to_string())));
        k8s.expect_get_deployments().returning(|_| Ok(vec![]));
        k8s.expect_get_replica_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_stateful_sets().returning(|_| Ok(vec![]));
        k8s.expect_get_daemon_sets().returning(|_| Ok(vec![]));
        let service = service(k8s, MockMetricsClient::new(), Config::default());

        let result = service
            .get_workload_list(&WorkloadCriteria::new("Namespace"))
            .await;

        assert!(matches!(
            result,
            Err(BusinessError::Kubernetes(ClientError::Forbidden(_)))
        ));
    }

    #[tokio::test]
    async fn get_workload_attaches_pods_and_services() {
        let mut k8s = details_client();
        k8s.expect_get_services()
            .returning(|_| Ok(vec![fake_details_service(), fake_reviews_service()]));
        let service = service(k8s, MockMetricsClient::new(), Config::default());
        let criteria = WorkloadCriteria {
            workload_name: "details-v1".to_string(),
            include_services: true,
            ..WorkloadCriteria::new("Namespace")
        };

        let workload = service.get_workload(&criteria).await.unwrap().unwrap();

        assert_eq!(workload.kind, WorkloadKind::Deployment);
        assert_eq!(workload.pods.len(), 1);
        let services: Vec<String> = workload
            .services
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(services, vec!["details"]);
    }

    #[tokio::test]
    async fn get_workload_returns_none_for_unknown_name() {
        let service = service(details_client(), MockMetricsClient::new(), Config::default());
        let criteria = WorkloadCriteria {
            workload_name: "details-v1-3618568057".to_string(),
            ..WorkloadCriteria::new("Namespace")
        };

        assert!(service.get_workload(&criteria).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_workload_attaches_health() {
        let mut metrics = MockMetricsClient::new();
        metrics.expect_query().returning(|query, _| {
            if query.contains("reporter=\"destination\"") {
                Ok(vec![Sample {
                    labels: [
                        ("destination_workload", "details-v1"),
                        ("request_protocol", "http"),
                        ("response_code", "200"),
                    ]
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                    value: 3.0,
                }])
            } else {
                Ok(vec![])
            }
        });
        let service = service(details_client(), metrics, Config::default());
        let criteria = WorkloadCriteria {
            workload_name: "details-v1".to_string(),
            include_health: true,
            ..WorkloadCriteria::new("Namespace")
        };

        let workload = service.get_workload(&criteria).await.unwrap().unwrap();

        let health = workload.health.unwrap();
        assert_eq!(health.workload_status.synced_proxies, 1);
        assert_eq!(health.requests.inbound["http"]["200"], 3.0);
    }

    #[tokio::test]
    async fn get_pods_passes_label_selector() {
        let mut k8s = MockK8sClient::new();
        k8s.expect_get_pods()
            .withf(|namespace, selector| namespace == "Namespace" && selector == "app=httpbin")
            .returning(|_, _| Ok(fake_pods_synced_with_deployments()));
        let service = service(k8s, MockMetricsClient::new(), Config::default());

        let pods = service.get_pods("Namespace", "app=httpbin").await.unwrap();

        assert_eq!(pods.len(), 1);
        assert!(pods[0].has_istio_sidecar());
    }

    #[tokio::test]
    async fn get_pod_reports_not_found() {
        let mut k8s = MockK8sClient::new();
        k8s.expect_get_pod().returning(|_, name| {
            Err(ClientError::NotFound {
                kind: "Pod".to_string(),
                name: name.to_string(),
            })
        });
        let service = service(k8s, MockMetricsClient::new(), Config::default());

        let result = service.get_pod("Namespace", "missing").await;

        assert!(matches!(
            result,
            Err(BusinessError::Kubernetes(ClientError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn stream_pod_logs_writes_pod_log_json() {
        let mut k8s = MockK8sClient::new();
        k8s.expect_get_pod_logs()
            .withf(|namespace, pod, options| {
                namespace == "Namespace"
                    && pod == "details-v1-3618568057-dnkjp"
                    && *options
                        == PodLogOptions {
                            container: Some("details".to_string()),
                            since_time: DateTime::from_timestamp(1514864068, 0),
                        }
            })
            .returning(|_, _, _| Ok(DETAILS_LOGS.to_string()));
        let service = service(k8s, MockMetricsClient::new(), Config::default());
        let options = LogOptions {
            container: Some("details".to_string()),
            since_time: DateTime::from_timestamp(1514864068, 0),
            duration: crate::models::time::parse_duration("2h"),
            max_lines: Some(2),
            ..Default::default()
        };
        let mut out = Vec::new();

        service
            .stream_pod_logs("Namespace", "details-v1-3618568057-dnkjp", &options, &mut out)
            .await
            .unwrap();

        let pod_log: PodLog = serde_json::from_slice(&out).unwrap();
        assert_eq!(pod_log.entries.len(), 2);
        assert_eq!(pod_log.entries[1].message, "WARN #2 Log Message");
        assert_eq!(pod_log.entries[1].severity, "WARN");
        assert!(pod_log.lines_truncated);
    }
}
