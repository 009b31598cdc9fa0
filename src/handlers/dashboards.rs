use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;

use crate::business::{BusinessError, ObjectType};
use crate::handlers::params::DashboardParams;
use crate::models::MonitoringDashboard;
use crate::server::AppState;

async fn dashboard(
    state: &AppState,
    object_type: ObjectType,
    namespace: &str,
    name: &str,
    params: &DashboardParams,
) -> Result<Json<MonitoringDashboard>, BusinessError> {
    info!("API: Dashboard of {:?} {}/{}", object_type, namespace, name);

    let query = params.query()?;
    let dashboard = state
        .layer
        .dashboards
        .build_dashboard(object_type, namespace, name, &query)
        .await?;
    Ok(Json(dashboard))
}

pub async fn app_dashboard(
    State(state): State<AppState>,
    Path((namespace, app)): Path<(String, String)>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<MonitoringDashboard>, BusinessError> {
    dashboard(&state, ObjectType::App, &namespace, &app, &params).await
}

pub async fn service_dashboard(
    State(state): State<AppState>,
    Path((namespace, service)): Path<(String, String)>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<MonitoringDashboard>, BusinessError> {
    dashboard(&state, ObjectType::Service, &namespace, &service, &params).await
}

pub async fn workload_dashboard(
    State(state): State<AppState>,
    Path((namespace, workload)): Path<(String, String)>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<MonitoringDashboard>, BusinessError> {
    dashboard(&state, ObjectType::Workload, &namespace, &workload, &params).await
}
