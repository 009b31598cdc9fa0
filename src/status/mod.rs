//! Mesh and infrastructure version detection
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌───────────────┐
//! │  Fetchers   │────▶│ Classifier  │────▶│ Compatibility │
//! │ (istio,...) │     │  (regexes)  │     │   (matrix)    │
//! └─────────────┘     └─────────────┘     └───────────────┘
//!        │                                        │
//!        ▼                                        ▼
//! ┌─────────────┐                         ┌───────────────┐
//! │   Checker   │────────────────────────▶│  StatusStore  │
//! │ (aggregate) │                         │  (warnings)   │
//! └─────────────┘                         └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: runs every fetcher and records the external services
//! - [`classifier`]: maps raw mesh version strings to a product
//! - [`compatibility`]: embedded compatibility matrix and version checks
//! - [`fetcher`]: `VersionFetcher` trait
//! - [`fetchers`]: one fetcher per external component
//! - [`store`]: process-wide status values and warnings
//! - [`semver`]: version parsing helpers
//! - [`types`]: `ExternalServiceInfo` and mesh product names

pub mod checker;
pub mod classifier;
pub mod compatibility;
pub mod error;
pub mod fetcher;
pub mod fetchers;
pub mod semver;
pub mod store;
pub mod types;

pub use checker::{MeshCheck, StatusChecker};
pub use error::StatusError;
pub use store::{StatusInfo, StatusStore};
pub use types::ExternalServiceInfo;
