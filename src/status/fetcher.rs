//! Trait for fetching the version of an external component

#[cfg(test)]
use mockall::automock;

use crate::status::error::StatusError;
use crate::status::types::ExternalServiceInfo;

/// One external component the console depends on (mesh, Prometheus, ...)
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionFetcher: Send + Sync {
    /// Component name used in logs
    fn component(&self) -> &'static str;

    /// Fetches the component's name/version/url record
    ///
    /// # Returns
    /// * `Ok(ExternalServiceInfo)` - The component is reachable
    /// * `Err(StatusError)` - The component could not be queried, or the
    ///   answer is unusable
    async fn fetch(&self) -> Result<ExternalServiceInfo, StatusError>;
}
