use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::business::error::BusinessError;
use crate::kubernetes::K8sClient;
use crate::models::Namespace;
use crate::models::time::parse_duration;

#[derive(Clone)]
pub struct NamespaceService {
    k8s: Arc<dyn K8sClient>,
}

impl NamespaceService {
    pub fn new(k8s: Arc<dyn K8sClient>) -> Self {
        Self { k8s }
    }

    pub async fn get_namespace(&self, name: &str) -> Result<Namespace, BusinessError> {
        let namespace = self.k8s.get_namespace(name).await?;
        Ok(Namespace::from_k8s(&namespace))
    }
}

/// Shortens `rate_interval` to the age of the namespace at `query_time`, so
/// rates of young namespaces are not averaged over time they did not exist.
pub fn adjust_rate_interval(
    namespace: &Namespace,
    rate_interval: &str,
    query_time: DateTime<Utc>,
) -> Result<String, BusinessError> {
    let interval = parse_duration(rate_interval).ok_or_else(|| {
        BusinessError::BadRequest(format!("Invalid rate interval: {}", rate_interval))
    })?;

    let Some(created) = namespace.creation_timestamp else {
        return Ok(rate_interval.to_string());
    };

    let age = query_time - created;
    if age < interval {
        let adjusted = format!("{}s", age.num_seconds().max(1));
        debug!(
            "Rate interval {} of namespace {} adjusted to {}",
            rate_interval, namespace.name, adjusted
        );
        return Ok(adjusted);
    }
    Ok(rate_interval.to_string())
}
