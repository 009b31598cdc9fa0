//! Shared fakes for the HTTP API tests

#![allow(dead_code)]

pub mod cluster;
pub mod metrics;

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use meshscope::business::Layer;
use meshscope::config::Config;
use meshscope::server::{AppState, router};
use meshscope::status::{StatusChecker, StatusStore};

pub use cluster::FakeCluster;
pub use metrics::FakeMetrics;

/// Router over the fake bookinfo cluster and fake Prometheus
pub fn bookinfo_router() -> Router {
    router_with(FakeCluster::bookinfo(), FakeMetrics::bookinfo(), Config::default())
}

pub fn router_with(cluster: FakeCluster, metrics: FakeMetrics, config: Config) -> Router {
    let k8s = Arc::new(cluster);
    let store = Arc::new(StatusStore::new());
    let status = StatusChecker::new(&config, k8s.clone(), store).expect("embedded matrix loads");

    router(AppState {
        layer: Layer::new(k8s, Arc::new(metrics), Arc::new(config)),
        status: Arc::new(status),
    })
}

/// Sends a GET request and returns the status with the JSON body
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}
