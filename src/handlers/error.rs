use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::business::BusinessError;
use crate::kubernetes::ClientError;

impl BusinessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BusinessError::NotFound(_) | BusinessError::Kubernetes(ClientError::NotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            BusinessError::BadRequest(_) => StatusCode::BAD_REQUEST,
            BusinessError::Kubernetes(ClientError::Forbidden(_)) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
