use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::server::AppState;
use crate::status::StatusInfo;

/// Refreshes the external service versions and returns the status snapshot
pub async fn status(State(state): State<AppState>) -> Json<StatusInfo> {
    Json(state.status.status().await)
}

pub async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
