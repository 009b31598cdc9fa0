use thiserror::Error;

use crate::kubernetes::ClientError;
use crate::prometheus::MetricsError;

#[derive(Debug, Error)]
pub enum BusinessError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Kubernetes(#[from] ClientError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Failed to write response: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    Serialization(#[from] serde_json::Error),
}
