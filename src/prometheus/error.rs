use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid Prometheus URL: {0}")]
    Url(String),

    #[error("Prometheus query failed ({error_type}): {message}")]
    Query { error_type: String, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Could not read the service account token: {0}")]
    Token(#[from] std::io::Error),
}
