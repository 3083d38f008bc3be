//! Package-manager detection.
//!
//! On Linux the portal offers DEB and RPM installers next to a plain TGZ
//! archive. Which one to download, and how to install it, follows from the
//! package managers present on the host.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use log::debug;

/// Package formats the portal publishes for Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    Deb,
    Rpm,
    Tgz,
}

impl PackageFormat {
    /// File extension as it appears in the portal's package paths.
    pub fn extension(&self) -> &'static str {
        match self {
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
            PackageFormat::Tgz => "tgz",
        }
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for PackageFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "deb" => Ok(PackageFormat::Deb),
            "rpm" => Ok(PackageFormat::Rpm),
            "tgz" => Ok(PackageFormat::Tgz),
            other => Err(anyhow!("Unknown package format: {:?}", other)),
        }
    }
}

/// How to hand a downloaded package to the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl InstallCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parse a user-supplied override such as "apt-get install -y".
    pub fn parse(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("Install command cannot be empty"))?;
        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Package managers probed on PATH, in order of preference, with the install
/// invocation each one uses.
const PACKAGE_MANAGERS: &[(&str, PackageFormat, &[&str])] = &[
    ("apt", PackageFormat::Deb, &["install"]),
    ("apt-get", PackageFormat::Deb, &["install"]),
    ("dpkg", PackageFormat::Deb, &["-i"]),
    ("yum", PackageFormat::Rpm, &["install"]),
    ("dnf", PackageFormat::Rpm, &["install"]),
    ("rpm", PackageFormat::Rpm, &["-Uh"]),
    ("zypper", PackageFormat::Rpm, &["install"]),
];

/// Detect the preferred package format and the matching install command by
/// probing PATH for known package managers. Falls back to the plain tarball
/// when none is found.
#[tracing::instrument]
pub fn detect() -> (PackageFormat, Option<InstallCommand>) {
    detect_with(|manager| which::which(manager).is_ok())
}

/// Detection core, parameterized over the PATH probe for testability.
fn detect_with<F: Fn(&str) -> bool>(is_available: F) -> (PackageFormat, Option<InstallCommand>) {
    for (manager, format, args) in PACKAGE_MANAGERS {
        if is_available(manager) {
            debug!("Found package manager: {}", manager);
            return (*format, Some(InstallCommand::new(manager, args)));
        }
    }
    (PackageFormat::Tgz, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension_and_display() {
        assert_eq!(PackageFormat::Deb.extension(), "deb");
        assert_eq!(PackageFormat::Rpm.to_string(), "rpm");
        assert_eq!(PackageFormat::Tgz.to_string(), "tgz");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("deb".parse::<PackageFormat>().unwrap(), PackageFormat::Deb);
        assert_eq!("rpm".parse::<PackageFormat>().unwrap(), PackageFormat::Rpm);
        assert_eq!("tgz".parse::<PackageFormat>().unwrap(), PackageFormat::Tgz);
        assert!("exe".parse::<PackageFormat>().is_err());
    }

    #[test]
    fn test_detect_prefers_apt() {
        let (format, command) = detect_with(|m| m == "apt" || m == "dpkg" || m == "rpm");
        assert_eq!(format, PackageFormat::Deb);
        assert_eq!(command.unwrap(), InstallCommand::new("apt", &["install"]));
    }

    #[test]
    fn test_detect_dpkg_uses_dash_i() {
        let (format, command) = detect_with(|m| m == "dpkg");
        assert_eq!(format, PackageFormat::Deb);
        assert_eq!(command.unwrap(), InstallCommand::new("dpkg", &["-i"]));
    }

    #[test]
    fn test_detect_rpm_family() {
        let (format, command) = detect_with(|m| m == "zypper");
        assert_eq!(format, PackageFormat::Rpm);
        assert_eq!(
            command.unwrap(),
            InstallCommand::new("zypper", &["install"])
        );
    }

    #[test]
    fn test_detect_falls_back_to_tgz() {
        let (format, command) = detect_with(|_| false);
        assert_eq!(format, PackageFormat::Tgz);
        assert!(command.is_none());
    }

    #[test]
    fn test_install_command_parse() {
        let cmd = InstallCommand::parse("apt-get install -y").unwrap();
        assert_eq!(cmd.program, "apt-get");
        assert_eq!(cmd.args, vec!["install", "-y"]);

        assert!(InstallCommand::parse("   ").is_err());
    }

    #[test]
    fn test_install_command_display() {
        let cmd = InstallCommand::new("dpkg", &["-i"]);
        assert_eq!(cmd.to_string(), "dpkg -i");
    }
}
