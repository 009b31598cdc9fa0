//! Kubernetes access layer
//!
//! - [`client`]: `K8sClient` trait consumed by the business layer
//! - [`kube_client`]: implementation over `kube::Client`
//! - [`openshift`]: OpenShift-only resource definitions
//! - [`error`]: `ClientError`

pub mod client;
pub mod error;
pub mod kube_client;
pub mod openshift;

pub use client::{K8sClient, PodLogOptions};
pub use error::ClientError;
pub use kube_client::KubeClient;
