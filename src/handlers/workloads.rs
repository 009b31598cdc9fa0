use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use tracing::info;

use crate::business::{BusinessError, WorkloadCriteria};
use crate::handlers::params::{LogParams, WorkloadParams};
use crate::models::{Workload, WorkloadList};
use crate::server::AppState;

fn criteria(namespace: &str, params: &WorkloadParams) -> Result<WorkloadCriteria, BusinessError> {
    let health = params.health_params();
    Ok(WorkloadCriteria {
        workload_type: params.workload_type.clone().unwrap_or_default(),
        include_health: health.include_health(),
        rate_interval: health.rate_interval(),
        query_time: health.query_time()?,
        ..WorkloadCriteria::new(namespace)
    })
}

pub async fn workload_list(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Query(params): Query<WorkloadParams>,
) -> Result<Json<WorkloadList>, BusinessError> {
    info!("API: Listing workloads of namespace {}", namespace);

    let criteria = criteria(&namespace, &params)?;
    let workloads = state.layer.workloads.get_workload_list(&criteria).await?;
    Ok(Json(workloads))
}

pub async fn workload_details(
    State(state): State<AppState>,
    Path((namespace, workload)): Path<(String, String)>,
    Query(params): Query<WorkloadParams>,
) -> Result<Json<Workload>, BusinessError> {
    info!("API: Getting workload {}/{}", namespace, workload);

    let criteria = WorkloadCriteria {
        workload_name: workload.clone(),
        include_services: true,
        ..criteria(&namespace, &params)?
    };
    match state.layer.workloads.get_workload(&criteria).await? {
        Some(workload) => Ok(Json(workload)),
        None => Err(BusinessError::NotFound(format!(
            "Workload {} not found in namespace {}",
            workload, namespace
        ))),
    }
}

pub async fn pod_logs(
    State(state): State<AppState>,
    Path((namespace, pod)): Path<(String, String)>,
    Query(params): Query<LogParams>,
) -> Result<impl IntoResponse, BusinessError> {
    info!("API: Reading logs of pod {}/{}", namespace, pod);

    let options = params.options()?;
    let mut body = Vec::new();
    state
        .layer
        .workloads
        .stream_pod_logs(&namespace, &pod, &options, &mut body)
        .await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}
