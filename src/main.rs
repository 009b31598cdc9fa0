use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use meshscope::business::Layer;
use meshscope::config::Config;
use meshscope::kubernetes::{K8sClient, KubeClient};
use meshscope::prometheus::{MetricsClient, PrometheusClient};
use meshscope::server::{ApiServer, AppState};
use meshscope::status::{StatusChecker, StatusStore};

#[derive(Parser)]
#[command(name = "meshscope")]
#[command(version, about = "Service mesh console backend")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

async fn run(config: Config) -> anyhow::Result<()> {
    let config = Arc::new(config);

    let k8s: Arc<dyn K8sClient> = Arc::new(KubeClient::try_default().await?);
    let metrics: Arc<dyn MetricsClient> = Arc::new(PrometheusClient::new(
        config.external_services.prometheus.clone(),
        config.kubernetes_config.service_account_token_path.clone(),
    ));

    let status = Arc::new(StatusChecker::new(
        &config,
        k8s.clone(),
        Arc::new(StatusStore::new()),
    )?);
    status.check_version_compatibility().await;

    let state = AppState {
        layer: Layer::new(k8s, metrics, config.clone()),
        status,
    };

    info!("Starting meshscope {}", config.core_version);
    ApiServer::new(state, config.server.clone()).serve().await
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let _guard = meshscope::logging::init(&config.log)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(config))
}
