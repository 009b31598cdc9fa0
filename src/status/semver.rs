use semver::Version;

/// Trim the optional `v` found at the beginning of a version string.
pub fn trim_v(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Strips a leading 'v' and pads partial versions with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "v1.2" -> Version(1, 2, 0)
/// - "1.2.3-rc.1" -> Version(1, 2, 3, pre: rc.1)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = trim_v(version.trim());
    let parts: Vec<&str> = version.split('.').collect();
    let normalized = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => version.to_string(),
    };
    Version::parse(&normalized).ok()
}

/// Reduce a version string to its `X.Y` portion.
///
/// Strings without a dot are returned unchanged.
pub fn major_minor(version: &str) -> String {
    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => version.to_string(),
    }
}

/// True when `version` is `prefix` or continues it past a component boundary
/// ("1.18.2" and "1.18 (dev abc)" belong to "1.18", "1.180.0" does not).
pub fn has_version_prefix(version: &str, prefix: &str) -> bool {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return false;
    }
    match version.strip_prefix(prefix) {
        Some(rest) => rest.chars().next().is_none_or(|c| !c.is_ascii_digit()),
        None => false,
    }
}
