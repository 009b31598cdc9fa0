use thiserror::Error;

use crate::kubernetes::ClientError;

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Unreachable(String),

    #[error("getting {component} version returned error code [{code}]")]
    HttpStatus { component: &'static str, code: u16 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Incompatible(String),

    #[error("Could not read the service account token: {0}")]
    Token(#[from] std::io::Error),

    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] ClientError),
}
