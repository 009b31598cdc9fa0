//! Credentials sent to Prometheus

use std::path::Path;

use reqwest::RequestBuilder;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    #[default]
    None,
    Bearer(String),
    Basic {
        username: String,
        password: Option<String>,
    },
}

impl Credentials {
    /// Resolves the configured credentials. With `use_kiali_token` the service
    /// account token is read from `token_path` and takes precedence.
    pub fn resolve(auth: &AuthConfig, token_path: &Path) -> Result<Self, std::io::Error> {
        if auth.use_kiali_token {
            let token = std::fs::read_to_string(token_path)?;
            return Ok(Credentials::Bearer(token.trim().to_string()));
        }

        if let Some(token) = auth.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::Bearer(token.clone()));
        }

        if let Some(username) = auth.username.as_ref().filter(|u| !u.is_empty()) {
            return Ok(Credentials::Basic {
                username: username.clone(),
                password: auth.password.clone(),
            });
        }

        Ok(Credentials::None)
    }

    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::None => request,
            Credentials::Bearer(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, password.as_ref())
            }
        }
    }
}
