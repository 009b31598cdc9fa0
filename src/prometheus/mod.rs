//! Prometheus access: credentials, queries and errors

pub mod auth;
pub mod client;
pub mod error;

pub use client::{MetricsClient, PrometheusClient, QueryRange, Sample, SampleStream};
pub use error::MetricsError;
