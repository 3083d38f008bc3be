//! J-Link version scheme.
//!
//! SEGGER names versions like `V8.10g`: major, two-digit minor, and an
//! optional patch letter (`a` = 1, `b` = 2, ...). The J-Link DLL reports the
//! same version as an integer, `major * 10000 + minor * 100 + patch`, so
//! `V8.10g` is 81007 and `V7.96` is 79600.

use anyhow::{Result, anyhow};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// A J-Link software version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct JLinkVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl JLinkVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Convert the integer form reported by `JLINK_GetDLLVersion` into a
    /// version. Decodes arithmetically, so major versions of 10 and above
    /// stay correct.
    pub fn from_number(number: i32) -> Result<Self> {
        if number <= 0 {
            return Err(anyhow!("Invalid version number: {}", number));
        }
        let number = number as u32;
        Ok(Self {
            major: number / 10000,
            minor: (number / 100) % 100,
            patch: number % 100,
        })
    }

    /// The integer form reported by the J-Link DLL.
    pub fn number(&self) -> i32 {
        (self.major * 10000 + self.minor * 100 + self.patch) as i32
    }
}

impl fmt::Display for JLinkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}.{:02}", self.major, self.minor)?;
        if self.patch > 0 {
            write!(f, "{}", (b'a' + (self.patch - 1) as u8) as char)?;
        }
        Ok(())
    }
}

impl FromStr for JLinkVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let re = Regex::new(r"^[vV]?(\d+)\.(\d+)([a-z])?$").map_err(|e| anyhow!(e))?;
        let caps = re
            .captures(s.trim())
            .ok_or_else(|| anyhow!("Invalid version string: {:?}", s))?;

        let major: u32 = caps[1].parse()?;
        let minor: u32 = caps[2].parse()?;
        if minor >= 100 {
            return Err(anyhow!("Minor version out of range in {:?}", s));
        }
        let patch = caps
            .get(3)
            .map(|m| (m.as_str().as_bytes()[0] - b'a' + 1) as u32)
            .unwrap_or(0);

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}
