use std::collections::HashMap;

use crate::version::JLinkVersion;

/// One entry of the portal's version selector.
///
/// The portal addresses versions by an index string (`"0"` is the newest
/// release) and displays a version name such as `V8.10g`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionEntry {
    pub index: String,
    pub name: String,
}

/// A downloadable package as listed on the portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Display name, e.g. "J-Link Software and Documentation pack for Linux, DEB installer, 64-bit"
    pub name: String,
    /// Link target as published on the page
    pub path: String,
}

impl PackageInfo {
    /// Final path segment of the published link; the portal serves files
    /// under its own root by this name.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Download URL for this package under the given portal base URL.
    pub fn download_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.file_name())
    }
}

/// Packages of one version, grouped by the portal's OS headers
/// ("Linux", "Linux ARM", "Windows", "Windows ARM", "macOS").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageCatalog {
    groups: HashMap<String, Vec<PackageInfo>>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, os: &str, package: PackageInfo) {
        self.groups.entry(os.to_string()).or_default().push(package);
    }

    pub fn group(&self, os: &str) -> Option<&[PackageInfo]> {
        self.groups.get(os).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Resolve a requested version name to a portal index.
///
/// Matches the option text case-insensitively, and also numerically through
/// the version scheme so "8.10g" finds "V8.10g".
pub fn find_version_index<'a>(versions: &'a [VersionEntry], requested: &str) -> Option<&'a str> {
    let wanted: Option<JLinkVersion> = requested.parse().ok();

    versions
        .iter()
        .find(|entry| {
            if entry.name.eq_ignore_ascii_case(requested) {
                return true;
            }
            match (&wanted, entry.name.parse::<JLinkVersion>()) {
                (Some(w), Ok(v)) => *w == v,
                _ => false,
            }
        })
        .map(|entry| entry.index.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: &str, name: &str) -> VersionEntry {
        VersionEntry {
            index: index.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_file_name_from_path() {
        let pkg = PackageInfo {
            name: "64-bit DEB Installer".to_string(),
            path: "/downloads/jlink/JLink_Linux_x86_64.deb".to_string(),
        };
        assert_eq!(pkg.file_name(), "JLink_Linux_x86_64.deb");
    }

    #[test]
    fn test_file_name_without_directories() {
        let pkg = PackageInfo {
            name: "Installer".to_string(),
            path: "JLink_Windows_x86_64.exe".to_string(),
        };
        assert_eq!(pkg.file_name(), "JLink_Windows_x86_64.exe");
    }

    #[test]
    fn test_download_url_joins_base() {
        let pkg = PackageInfo {
            name: "Installer".to_string(),
            path: "/downloads/jlink/JLink_Linux_x86_64.tgz".to_string(),
        };
        assert_eq!(
            pkg.download_url("https://www.segger.com/downloads/jlink/"),
            "https://www.segger.com/downloads/jlink/JLink_Linux_x86_64.tgz"
        );
        assert_eq!(
            pkg.download_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080/JLink_Linux_x86_64.tgz"
        );
    }

    #[test]
    fn test_catalog_groups() {
        let mut catalog = PackageCatalog::new();
        catalog.add(
            "Linux",
            PackageInfo {
                name: "a".into(),
                path: "a.deb".into(),
            },
        );
        catalog.add(
            "Linux",
            PackageInfo {
                name: "b".into(),
                path: "b.rpm".into(),
            },
        );

        assert_eq!(catalog.group("Linux").unwrap().len(), 2);
        assert!(catalog.group("Windows").is_none());
        assert!(!catalog.is_empty());
        assert!(PackageCatalog::new().is_empty());
    }

    #[test]
    fn test_find_version_index_by_name() {
        let versions = vec![entry("0", "V8.10g"), entry("1", "V8.10f")];
        assert_eq!(find_version_index(&versions, "V8.10f"), Some("1"));
    }

    #[test]
    fn test_find_version_index_case_insensitive() {
        let versions = vec![entry("0", "V8.10g")];
        assert_eq!(find_version_index(&versions, "v8.10G"), Some("0"));
    }

    #[test]
    fn test_find_version_index_numeric_match() {
        let versions = vec![entry("0", "V8.10g"), entry("1", "V7.96")];
        // Bare version string resolves through the version scheme
        assert_eq!(find_version_index(&versions, "8.10g"), Some("0"));
        assert_eq!(find_version_index(&versions, "7.96"), Some("1"));
    }

    #[test]
    fn test_find_version_index_unknown() {
        let versions = vec![entry("0", "V8.10g")];
        assert_eq!(find_version_index(&versions, "V1.00"), None);
        assert_eq!(find_version_index(&versions, "garbage"), None);
    }
}
