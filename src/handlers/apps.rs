use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::info;

use crate::business::{AppCriteria, BusinessError};
use crate::handlers::params::HealthParams;
use crate::models::{App, AppList};
use crate::server::AppState;

fn criteria(namespace: &str, params: &HealthParams) -> Result<AppCriteria, BusinessError> {
    Ok(AppCriteria {
        include_health: params.include_health(),
        rate_interval: params.rate_interval(),
        query_time: params.query_time()?,
        ..AppCriteria::new(namespace)
    })
}

pub async fn app_list(
    State(state): State<AppState>,
    Path(namespace): Path<String>,
    Query(params): Query<HealthParams>,
) -> Result<Json<AppList>, BusinessError> {
    info!("API: Listing apps of namespace {}", namespace);

    let criteria = criteria(&namespace, &params)?;
    let apps = state.layer.apps.get_app_list(&criteria).await?;
    Ok(Json(apps))
}

pub async fn app_details(
    State(state): State<AppState>,
    Path((namespace, app)): Path<(String, String)>,
    Query(params): Query<HealthParams>,
) -> Result<Json<App>, BusinessError> {
    info!("API: Getting app {}/{}", namespace, app);

    let criteria = AppCriteria {
        app_name: app,
        ..criteria(&namespace, &params)?
    };
    let app = state.layer.apps.get_app_details(&criteria).await?;
    Ok(Json(app))
}
