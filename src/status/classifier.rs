//! Raw mesh version classifier
//!
//! Control planes report opaque version strings whose shape depends on the
//! distribution that built them. The classifier tries each known shape in
//! priority order and stops at the first match.
//!
//! Examples:
//! - Maistra product: `redhat@redhat-docker.io/maistra-0.1.0-1-3a136c90ec5e308f236e0d7ebb5c4c5e405217f4-unknown`
//! - Maistra project: `Maistra_1.1.0-291c5419cf19d2b015e7e5dee970c458fb8f1982-Clean`
//! - OpenShift Service Mesh: `OSSM_1.1.0-291c5419cf19d2b015e7e5dee970c458fb8f1982-Clean`
//! - Istio snapshot: `root@f72e3d3ef3c2-docker.io/istio-release-1.0-20180927-21-10-cbe9c05c470ec1924f7bcf02334b183e7e6175cb-Clean`
//! - Istio RC: `1.7.0-alpha.1-cd46a166947eac363380c3aa3523b26a8c391f98-dirty-Modified`
//! - Istio dev: `1.10-dev-65a124dc2ab69f91331298fbf6d9b4335abcf0fd-Clean`

use regex::Regex;
use tracing::debug;

use crate::status::types::{MeshProduct, MeshProductName};

pub struct RawVersionClassifier {
    maistra_product_re: Regex,
    maistra_project_re: Regex,
    ossm_re: Regex,
    istio_snapshot_re: Regex,
    istio_rc_re: Regex,
    istio_dev_re: Regex,
    istio_release_re: Regex,
}

impl RawVersionClassifier {
    pub fn new() -> Self {
        Self {
            maistra_product_re: Regex::new(r"maistra-([0-9]+\.[0-9]+\.[0-9]+)").unwrap(),
            maistra_project_re: Regex::new(r"(?:Maistra_|openshift-istio.*-)([0-9]+\.[0-9]+\.[0-9]+)")
                .unwrap(),
            ossm_re: Regex::new(r"(?:OSSM_|openshift-service-mesh-)([0-9]+\.[0-9]+\.[0-9]+)").unwrap(),
            istio_snapshot_re: Regex::new(r"istio-release-([0-9]+\.[0-9]+)(-[0-9]{8})").unwrap(),
            istio_rc_re: Regex::new(r"(\d+\.\d+.\d+)-((?:alpha|beta|rc|RC)\.\d+)").unwrap(),
            istio_dev_re: Regex::new(
                r"(\d+\.\d+)-alpha\.([[:alnum:]]+)-.*|(\d+\.\d+)-dev-([[:alnum:]]+)-.*",
            )
            .unwrap(),
            istio_release_re: Regex::new(r"([0-9]+\.[0-9]+\.[0-9]+)").unwrap(),
        }
    }

    /// Classify a raw version string into exactly one mesh product
    pub fn classify(&self, raw_version: &str) -> MeshProduct {
        if let Some(caps) = self.maistra_product_re.captures(raw_version) {
            debug!("Detected Maistra product version [{}]", raw_version);
            return MeshProduct::new(MeshProductName::Maistra, &caps[1]);
        }

        if let Some(caps) = self.maistra_project_re.captures(raw_version) {
            debug!("Detected Maistra project version [{}]", raw_version);
            return MeshProduct::new(MeshProductName::MaistraProject, &caps[1]);
        }

        if let Some(caps) = self.ossm_re.captures(raw_version) {
            debug!("Detected OpenShift Service Mesh version [{}]", raw_version);
            return MeshProduct::new(MeshProductName::OpenShiftServiceMesh, &caps[1]);
        }

        if let Some(caps) = self.istio_snapshot_re.captures(raw_version) {
            debug!("Detected Istio snapshot version [{}]", raw_version);
            // major.minor followed by the date stamp
            return MeshProduct::new(
                MeshProductName::IstioSnapshot,
                format!("{}{}", &caps[1], &caps[2]),
            );
        }

        if let Some(caps) = self.istio_rc_re.captures(raw_version) {
            debug!("Detected Istio RC version [{}]", raw_version);
            return MeshProduct::new(
                MeshProductName::IstioRc,
                format!("{} ({})", &caps[1], &caps[2]),
            );
        }

        if let Some(caps) = self.istio_dev_re.captures(raw_version) {
            debug!("Detected Istio dev version [{}]", raw_version);
            let groups = caps
                .get(1)
                .zip(caps.get(2))
                .or_else(|| caps.get(3).zip(caps.get(4)));
            if let Some((major_minor, build_hash)) = groups {
                return MeshProduct::new(
                    MeshProductName::IstioDev,
                    format!("{} (dev {})", major_minor.as_str(), build_hash.as_str()),
                );
            }
        }

        if let Some(caps) = self.istio_release_re.captures(raw_version) {
            debug!("Detected Istio version [{}]", raw_version);
            return MeshProduct::new(MeshProductName::Istio, &caps[1]);
        }

        debug!("Detected unknown Istio implementation version [{}]", raw_version);
        MeshProduct::new(MeshProductName::Unknown, raw_version)
    }
}

impl Default for RawVersionClassifier {
    fn default() -> Self {
        Self::new()
    }
}
