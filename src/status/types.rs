//! Common types for version detection

use serde::Serialize;

/// Name/version/url record of an external service, produced on each status check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalServiceInfo {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl ExternalServiceInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Canonical mesh product detected from a raw version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshProductName {
    Maistra,
    MaistraProject,
    OpenShiftServiceMesh,
    Istio,
    IstioSnapshot,
    IstioRc,
    IstioDev,
    Unknown,
}

impl MeshProductName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeshProductName::Maistra => "Maistra",
            MeshProductName::MaistraProject => "Maistra Project",
            MeshProductName::OpenShiftServiceMesh => "OpenShift Service Mesh",
            MeshProductName::Istio => "Istio",
            MeshProductName::IstioSnapshot => "Istio Snapshot",
            MeshProductName::IstioRc => "Istio RC",
            MeshProductName::IstioDev => "Istio Dev",
            MeshProductName::Unknown => "Unknown Istio Implementation",
        }
    }

    /// Upstream Istio in any of its release flavours
    pub fn is_upstream_istio(&self) -> bool {
        matches!(
            self,
            MeshProductName::Istio
                | MeshProductName::IstioSnapshot
                | MeshProductName::IstioRc
                | MeshProductName::IstioDev
        )
    }
}

impl std::fmt::Display for MeshProductName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeshProductName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Maistra" => Ok(MeshProductName::Maistra),
            "Maistra Project" => Ok(MeshProductName::MaistraProject),
            "OpenShift Service Mesh" => Ok(MeshProductName::OpenShiftServiceMesh),
            "Istio" => Ok(MeshProductName::Istio),
            "Istio Snapshot" => Ok(MeshProductName::IstioSnapshot),
            "Istio RC" => Ok(MeshProductName::IstioRc),
            "Istio Dev" => Ok(MeshProductName::IstioDev),
            "Unknown Istio Implementation" => Ok(MeshProductName::Unknown),
            _ => Err(()),
        }
    }
}

/// Result of classifying a raw mesh version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshProduct {
    pub name: MeshProductName,
    pub version: String,
}

impl MeshProduct {
    pub fn new(name: MeshProductName, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
        }
    }

    pub fn into_service_info(self) -> ExternalServiceInfo {
        ExternalServiceInfo::new(self.name.as_str()).with_version(self.version)
    }
}
