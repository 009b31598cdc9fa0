pub mod istio;
pub mod kubernetes;
pub mod links;
pub mod prometheus;

pub use istio::IstioFetcher;
pub use kubernetes::KubernetesFetcher;
pub use links::{GrafanaFetcher, TracingFetcher};
pub use prometheus::PrometheusFetcher;
