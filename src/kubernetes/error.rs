use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Kubernetes API error: {0}")]
    Api(#[source] kube::Error),

    #[error("Kubernetes client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Maps a kube error raised while reading a single named object
    pub fn for_object(err: kube::Error, kind: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 404 => ClientError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            other => other.into(),
        }
    }
}

impl From<kube::Error> for ClientError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) if ae.code == 403 => ClientError::Forbidden(ae.message),
            other => ClientError::Api(other),
        }
    }
}
