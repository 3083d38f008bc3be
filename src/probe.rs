//! Installed-version probe.
//!
//! The J-Link package ships a shared library exporting
//! `JLINK_GetDLLVersion`, which reports the installed version as an integer.
//! The probe globs the vendor's install locations and asks the first library
//! that loads.

use log::debug;

use crate::pick::System;
use crate::version::JLinkVersion;

#[cfg_attr(test, mockall::automock)]
pub trait InstalledProbe: Send + Sync {
    /// The version currently installed on the host, if any.
    fn installed_version(&self, system: System) -> Option<JLinkVersion>;
}

/// Probe that loads the vendor library from its standard install locations.
pub struct LibraryProbe;

/// Glob patterns for the J-Link shared library per system.
fn library_patterns(system: System) -> &'static [&'static str] {
    match system {
        System::Linux => &["/opt/SEGGER/JLink*/libjlink*"],
        System::Windows => &[
            r"C:\Program Files\SEGGER\JLink*\JLink*.dll",
            r"C:\Program Files (x86)\SEGGER\JLink*\JLink*.dll",
        ],
        System::MacOs => &["/Applications/SEGGER/JLink*/libjlink*"],
    }
}

impl InstalledProbe for LibraryProbe {
    #[tracing::instrument(skip(self))]
    fn installed_version(&self, system: System) -> Option<JLinkVersion> {
        let patterns: Vec<String> = library_patterns(system)
            .iter()
            .map(|p| p.to_string())
            .collect();
        probe_patterns(&patterns)
    }
}

/// Try each glob pattern in turn; the first library that loads and reports a
/// valid version wins.
fn probe_patterns(patterns: &[String]) -> Option<JLinkVersion> {
    for pattern in patterns {
        let Ok(paths) = glob::glob(pattern) else {
            continue;
        };
        for path in paths.flatten() {
            debug!("Probing {:?} for installed version...", path);
            match read_library_version(&path) {
                Some(number) => match JLinkVersion::from_number(number) {
                    Ok(version) => return Some(version),
                    Err(e) => debug!("Library {:?} reported invalid version: {}", path, e),
                },
                None => debug!("Could not read version from {:?}", path),
            }
        }
    }
    None
}

/// Load the library and call its version export. Any failure is treated as
/// "not this library".
fn read_library_version(path: &std::path::Path) -> Option<i32> {
    // Loading an arbitrary matching file can fail in many ways (wrong
    // architecture, not a library at all); every failure just moves the
    // probe along.
    unsafe {
        let library = libloading::Library::new(path).ok()?;
        let get_version: libloading::Symbol<'_, unsafe extern "C" fn() -> i32> =
            library.get(b"JLINK_GetDLLVersion\0").ok()?;
        Some(get_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_library_patterns_per_system() {
        assert_eq!(
            library_patterns(System::Linux),
            &["/opt/SEGGER/JLink*/libjlink*"]
        );
        assert_eq!(library_patterns(System::Windows).len(), 2);
        assert_eq!(
            library_patterns(System::MacOs),
            &["/Applications/SEGGER/JLink*/libjlink*"]
        );
    }

    #[test]
    fn test_probe_no_matches_returns_none() {
        let dir = tempdir().unwrap();
        let pattern = format!("{}/JLink*/libjlink*", dir.path().display());
        assert_eq!(probe_patterns(&[pattern]), None);
    }

    #[test]
    fn test_probe_skips_non_library_files() {
        // A matching path that is not a loadable library must not abort the
        // probe
        let dir = tempdir().unwrap();
        let lib_dir = dir.path().join("JLink_V810");
        std::fs::create_dir(&lib_dir).unwrap();
        std::fs::write(lib_dir.join("libjlink.so"), "not a real library").unwrap();

        let pattern = format!("{}/JLink*/libjlink*", dir.path().display());
        assert_eq!(probe_patterns(&[pattern]), None);
    }

    #[test]
    fn test_probe_invalid_glob_pattern_is_skipped() {
        assert_eq!(probe_patterns(&["[".to_string()]), None);
    }
}
