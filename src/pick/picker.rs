use crate::pkgmgr::PackageFormat;
use crate::portal::{PackageCatalog, PackageInfo};

use super::platform::{Host, System};

/// Trait for selecting a package from a version's catalog
pub trait PackagePicker: Send + Sync {
    /// Pick the most appropriate package for the configured host
    ///
    /// Returns `None` if no suitable package is found
    fn pick<'a>(&self, catalog: &'a PackageCatalog) -> Option<&'a PackageInfo>;
}

/// Default picker applying the portal's naming conventions per OS group
pub struct DefaultPackagePicker {
    host: Host,
    preferred_format: Option<PackageFormat>,
}

impl DefaultPackagePicker {
    pub fn new(host: Host, preferred_format: Option<PackageFormat>) -> Self {
        Self {
            host,
            preferred_format,
        }
    }

    /// Linux rules: names carry a "64-bit" marker; installers come as deb,
    /// rpm and a plain tgz. Take the preferred installer format when present,
    /// otherwise fall back to the tarball.
    fn pick_linux<'a>(&self, packages: &'a [PackageInfo]) -> Option<&'a PackageInfo> {
        let arch_matches: Vec<_> = packages
            .iter()
            .filter(|pkg| pkg.name.contains("64-bit") == self.host.arch.is_64bit())
            .collect();

        if let Some(preferred) = self.preferred_format {
            if matches!(preferred, PackageFormat::Deb | PackageFormat::Rpm) {
                let suffix = format!(".{}", preferred.extension());
                if let Some(pkg) = arch_matches.iter().find(|pkg| pkg.path.ends_with(&suffix)) {
                    return Some(*pkg);
                }
            }
        }

        arch_matches
            .into_iter()
            .find(|pkg| pkg.path.ends_with(".tgz"))
    }

    /// Windows rules: one installer per width
    fn pick_windows<'a>(&self, packages: &'a [PackageInfo]) -> Option<&'a PackageInfo> {
        packages
            .iter()
            .find(|pkg| pkg.name.contains("64-bit") == self.host.arch.is_64bit())
    }

    /// macOS rules: a Universal package serves everything; otherwise pick by
    /// silicon family
    fn pick_macos<'a>(&self, packages: &'a [PackageInfo]) -> Option<&'a PackageInfo> {
        if let Some(pkg) = packages.iter().find(|pkg| pkg.name.contains("Universal")) {
            return Some(pkg);
        }

        let marker = if self.host.arch.is_arm() {
            "Apple Silicon"
        } else {
            "Intel Silicon"
        };
        packages.iter().find(|pkg| pkg.name.contains(marker))
    }
}

impl PackagePicker for DefaultPackagePicker {
    fn pick<'a>(&self, catalog: &'a PackageCatalog) -> Option<&'a PackageInfo> {
        let packages = catalog.group(self.host.os_group())?;

        match self.host.system {
            System::Linux => self.pick_linux(packages),
            System::Windows => self.pick_windows(packages),
            System::MacOs => self.pick_macos(packages),
        }
    }
}
