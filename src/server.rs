use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tracing::info;

use crate::business::Layer;
use crate::config::ServerConfig;
use crate::handlers;
use crate::status::StatusChecker;

#[derive(Clone)]
pub struct AppState {
    pub layer: Layer,
    pub status: Arc<StatusChecker>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        // Apps
        .route("/api/namespaces/{namespace}/apps", get(handlers::app_list))
        .route(
            "/api/namespaces/{namespace}/apps/{app}",
            get(handlers::app_details),
        )
        .route(
            "/api/namespaces/{namespace}/apps/{app}/dashboard",
            get(handlers::app_dashboard),
        )
        // Workloads and pods
        .route(
            "/api/namespaces/{namespace}/workloads",
            get(handlers::workload_list),
        )
        .route(
            "/api/namespaces/{namespace}/workloads/{workload}",
            get(handlers::workload_details),
        )
        .route(
            "/api/namespaces/{namespace}/workloads/{workload}/dashboard",
            get(handlers::workload_dashboard),
        )
        .route(
            "/api/namespaces/{namespace}/pods/{pod}/logs",
            get(handlers::pod_logs),
        )
        // Services
        .route(
            "/api/namespaces/{namespace}/services/{service}/dashboard",
            get(handlers::service_dashboard),
        )
        // Status
        .route("/api/status", get(handlers::status))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

pub struct ApiServer {
    app: Router,
    config: ServerConfig,
}

impl ApiServer {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self {
            app: router(state),
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!("API server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.app).await?;

        Ok(())
    }
}
