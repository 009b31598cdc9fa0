//! HTTP handlers mapping REST requests onto the business layer

pub mod apps;
pub mod dashboards;
pub mod error;
pub mod params;
pub mod status;
pub mod workloads;

pub use apps::*;
pub use dashboards::*;
pub use status::*;
pub use workloads::*;
