use anyhow::{Result, anyhow};
use std::fmt;
use std::str::FromStr;

/// Operating systems the portal publishes packages for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum System {
    Linux,
    MacOs,
    Windows,
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::Linux => f.write_str("Linux"),
            System::MacOs => f.write_str("macOS"),
            System::Windows => f.write_str("Windows"),
        }
    }
}

impl FromStr for System {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(System::Linux),
            "macos" | "darwin" | "macosx" => Ok(System::MacOs),
            "windows" => Ok(System::Windows),
            other => Err(anyhow!("Unknown system: {:?}", other)),
        }
    }
}

/// CPU architectures the portal distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    Arm64,
}

impl Arch {
    pub fn is_64bit(&self) -> bool {
        matches!(self, Arch::X86_64 | Arch::Arm64)
    }

    pub fn is_arm(&self) -> bool {
        matches!(self, Arch::Arm | Arch::Arm64)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => f.write_str("i386"),
            Arch::X86_64 => f.write_str("x86_64"),
            Arch::Arm => f.write_str("arm"),
            Arch::Arm64 => f.write_str("arm64"),
        }
    }
}

impl FromStr for Arch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "i386" | "i686" | "x86" => Ok(Arch::X86),
            "x86_64" | "amd64" | "x64" => Ok(Arch::X86_64),
            "arm" | "armhf" | "armv7" => Ok(Arch::Arm),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            other => Err(anyhow!("Unknown architecture: {:?}", other)),
        }
    }
}

/// The platform a package is selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Host {
    pub system: System,
    pub arch: Arch,
}

impl Host {
    /// Detect the current host from the compile-time target.
    pub fn detect() -> Result<Self> {
        Ok(Self {
            system: Self::detect_system()?,
            arch: Self::detect_arch()?,
        })
    }

    fn detect_system() -> Result<System> {
        #[cfg(target_os = "linux")]
        {
            Ok(System::Linux)
        }
        #[cfg(target_os = "macos")]
        {
            Ok(System::MacOs)
        }
        #[cfg(target_os = "windows")]
        {
            Ok(System::Windows)
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            Err(anyhow!("Unsupported system: {}", std::env::consts::OS))
        }
    }

    fn detect_arch() -> Result<Arch> {
        #[cfg(target_arch = "x86_64")]
        {
            Ok(Arch::X86_64)
        }
        #[cfg(target_arch = "aarch64")]
        {
            Ok(Arch::Arm64)
        }
        #[cfg(target_arch = "x86")]
        {
            Ok(Arch::X86)
        }
        #[cfg(target_arch = "arm")]
        {
            Ok(Arch::Arm)
        }
        #[cfg(not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "x86",
            target_arch = "arm"
        )))]
        {
            Err(anyhow!(
                "Unsupported architecture: {}",
                std::env::consts::ARCH
            ))
        }
    }

    /// The portal's OS group header this host falls under.
    pub fn os_group(&self) -> &'static str {
        match self.system {
            System::Linux => {
                if self.arch.is_arm() {
                    "Linux ARM"
                } else {
                    "Linux"
                }
            }
            System::Windows => {
                if self.arch.is_arm() {
                    "Windows ARM"
                } else {
                    "Windows"
                }
            }
            System::MacOs => "macOS",
        }
    }
}
