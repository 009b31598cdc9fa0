//! Mesh/core compatibility matrix
//!
//! The matrix is embedded at build time and only read afterwards. Checks are
//! pure functions of the matrix and the two versions involved.

use serde::Deserialize;
use tracing::debug;

use crate::status::error::StatusError;
use crate::status::semver::{has_version_prefix, major_minor, parse_version, trim_v};
use crate::status::types::MeshProductName;

const EMBEDDED_MATRIX: &str = include_str!("compatibility_matrix.json");

const ISTIO_MESH: &str = "Istio";
const OSSM_MESH: &str = "OpenShift Service Mesh";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VersionRange {
    pub mesh_version: String,
    #[serde(default)]
    pub kiali_minimum_version: String,
    #[serde(default)]
    pub kiali_maximum_version: String,
    #[serde(default)]
    pub kiali_fixed_version: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MeshCompatibility {
    pub mesh_name: String,
    pub version_range: Vec<VersionRange>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CompatibilityMatrix {
    meshes: Vec<MeshCompatibility>,
}

impl CompatibilityMatrix {
    /// Parses the matrix shipped with the binary
    pub fn embedded() -> Result<Self, StatusError> {
        Self::from_json(EMBEDDED_MATRIX)
    }

    pub fn from_json(json: &str) -> Result<Self, StatusError> {
        serde_json::from_str(json).map_err(|e| StatusError::InvalidResponse(e.to_string()))
    }

    fn ranges(&self, mesh_name: &str) -> &[VersionRange] {
        self.meshes
            .iter()
            .find(|mesh| mesh.mesh_name == mesh_name)
            .map(|mesh| mesh.version_range.as_slice())
            .unwrap_or_default()
    }

    /// Decides whether `core_version` is supported by the installed mesh
    pub fn check_mesh_version(
        &self,
        mesh_name: MeshProductName,
        mesh_version: &str,
        core_version: &str,
    ) -> bool {
        if mesh_name.is_upstream_istio() {
            self.check_istio_version(mesh_version, core_version)
        } else if mesh_name == MeshProductName::OpenShiftServiceMesh {
            self.check_ossm_version(mesh_version, core_version)
        } else {
            debug!("No compatibility data for mesh [{}]", mesh_name);
            false
        }
    }

    fn check_istio_version(&self, mesh_version: &str, core_version: &str) -> bool {
        self.ranges(ISTIO_MESH)
            .iter()
            .filter(|range| has_version_prefix(mesh_version, &range.mesh_version))
            .any(|range| {
                check_range(
                    &range.kiali_minimum_version,
                    &range.kiali_maximum_version,
                    &range.kiali_fixed_version,
                    core_version,
                )
            })
    }

    // OSSM releases pair with exactly one core release line, so only X.Y of
    // both versions takes part in the comparison.
    fn check_ossm_version(&self, mesh_version: &str, core_version: &str) -> bool {
        let mesh_version = major_minor(trim_v(mesh_version));
        let core_version = major_minor(trim_v(core_version));

        self.ranges(OSSM_MESH)
            .iter()
            .filter(|range| range.mesh_version == mesh_version)
            .any(|range| {
                range
                    .kiali_fixed_version
                    .iter()
                    .any(|fixed| major_minor(fixed) == core_version)
            })
    }
}

/// Checks `version` against a range. A non-empty fixed set only accepts
/// equality; otherwise both bounds are inclusive and optional.
pub fn check_range(low: &str, high: &str, fixed: &[String], version: &str) -> bool {
    if !fixed.is_empty() {
        return fixed
            .iter()
            .any(|fixed| validate_version(&format!("== {}", fixed), version));
    }

    let above_low = low.is_empty() || validate_version(&format!(">= {}", low), version);
    let below_high = high.is_empty() || validate_version(&format!("<= {}", high), version);
    above_low && below_high
}

/// Evaluates a requirement of the form `"<op> <version>"` against `installed`.
///
/// Supported operators are `==`, `>=`, `>`, `<=` and `<`. A requirement or
/// version that cannot be parsed fails the check.
pub fn validate_version(requirement: &str, installed: &str) -> bool {
    let mut parts = requirement.split_whitespace();
    let (Some(op), Some(required), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    let (Some(required), Some(installed)) = (parse_version(required), parse_version(installed))
    else {
        return false;
    };

    match op {
        "==" => installed == required,
        ">=" => installed >= required,
        ">" => installed > required,
        "<=" => installed <= required,
        "<" => installed < required,
        _ => false,
    }
}
