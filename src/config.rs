use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Time-related constants
// =============================================================================

/// Timeout applied to every outbound HTTP call (mesh, Prometheus)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate interval used by health and metrics queries when none is given
pub const DEFAULT_RATE_INTERVAL: &str = "10m";

/// Default dashboard time range in seconds (30 minutes)
pub const DEFAULT_DASHBOARD_DURATION_SECS: i64 = 1800;

/// Default dashboard resolution in seconds
pub const DEFAULT_DASHBOARD_STEP_SECS: i64 = 15;

/// Service account token mounted into every pod
pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Top level configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Version of this console, checked against the mesh compatibility matrix
    pub core_version: String,
    pub core_commit_hash: String,
    pub server: ServerConfig,
    pub log: LogConfig,
    pub external_services: ExternalServicesConfig,
    pub istio_labels: IstioLabels,
    pub kubernetes_config: KubernetesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            core_version: env!("CARGO_PKG_VERSION").to_string(),
            core_commit_hash: "unknown".to_string(),
            server: ServerConfig::default(),
            log: LogConfig::default(),
            external_services: ExternalServicesConfig::default(),
            istio_labels: IstioLabels::default(),
            kubernetes_config: KubernetesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 20001,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is not set
    pub level: String,
    pub format: LogFormat,
    /// Write logs to this file instead of stdout
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExternalServicesConfig {
    pub istio: IstioConfig,
    pub prometheus: PrometheusConfig,
    pub grafana: GrafanaConfig,
    pub tracing: TracingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IstioConfig {
    /// Endpoint returning the raw control plane version string
    pub url_service_version: String,
}

impl Default for IstioConfig {
    fn default() -> Self {
        Self {
            url_service_version: "http://istiod.istio-system:15014/version".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PrometheusConfig {
    pub url: String,
    pub auth: AuthConfig,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            url: "http://prometheus.istio-system:9090".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

/// Credentials for an external service
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Send the service account token of this process as bearer token
    pub use_kiali_token: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrafanaConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    pub url: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: String::new(),
        }
    }
}

/// Label names identifying apps and versions
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IstioLabels {
    pub app_label_name: String,
    pub version_label_name: String,
}

impl Default for IstioLabels {
    fn default() -> Self {
        Self {
            app_label_name: "app".to_string(),
            version_label_name: "version".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Workload kinds that are never fetched nor listed
    pub excluded_workloads: Vec<String>,
    pub service_account_token_path: PathBuf,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            excluded_workloads: vec![
                "CronJob".to_string(),
                "DeploymentConfig".to_string(),
                "Job".to_string(),
                "ReplicationController".to_string(),
            ],
            service_account_token_path: PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH),
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_workload_included(&self, kind: &str) -> bool {
        !self
            .kubernetes_config
            .excluded_workloads
            .iter()
            .any(|excluded| excluded == kind)
    }
}

/// Returns the path to the configuration file.
/// Uses $XDG_CONFIG_HOME/meshscope/config.json (or the platform equivalent),
/// or ./meshscope/config.json if no config directory is available.
pub fn config_path() -> PathBuf {
    config_path_with_dir(dirs::config_dir())
}

fn config_path_with_dir(config_dir: Option<PathBuf>) -> PathBuf {
    config_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meshscope")
        .join("config.json")
}
