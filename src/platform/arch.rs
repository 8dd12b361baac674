//! OS family and MATLAB architecture detection.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, RuntimeError};

/// The operating system families the MATLAB Runtime ships for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    Linux,
    MacOs,
}

impl OsFamily {
    /// Detect the family of the running OS.
    pub fn detect() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a family.
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOs),
            other => Err(RuntimeError::UnsupportedPlatform {
                platform: other.to_string(),
            }),
        }
    }

    /// Default installation prefix for this family.
    pub fn default_prefix(&self) -> &'static str {
        match self {
            Self::Windows => "C:\\Program Files\\MATLAB\\MATLAB Runtime\\",
            Self::Linux => "/usr/local/MATLAB/MATLAB_Runtime",
            Self::MacOs => "/Applications/MATLAB/MATLAB_Runtime",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "Windows"),
            Self::Linux => write!(f, "Linux"),
            Self::MacOs => write!(f, "macOS"),
        }
    }
}

/// MATLAB architecture identifier, as used in installer URLs and in the
/// `bin/<arch>` directories of an installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// Windows, 64 bits.
    Win64,
    /// Windows, 32 bits.
    Win32,
    /// Linux, 64 bits.
    Glnxa64,
    /// Linux, 32 bits.
    Glnx86,
    /// macOS on Intel.
    Maci64,
    /// macOS on Apple silicon.
    Maca64,
}

impl Arch {
    /// All known architectures.
    pub const ALL: [Arch; 6] = [
        Arch::Win64,
        Arch::Win32,
        Arch::Glnxa64,
        Arch::Glnx86,
        Arch::Maci64,
        Arch::Maca64,
    ];

    /// Detect the architecture of the running process.
    pub fn detect() -> Result<Self> {
        let family = OsFamily::detect()?;
        let wide = cfg!(target_pointer_width = "64");
        let arm = cfg!(target_arch = "aarch64");
        Ok(Self::from_parts(family, wide, arm))
    }

    /// Build an architecture from its OS family and CPU traits.
    pub fn from_parts(family: OsFamily, wide: bool, arm: bool) -> Self {
        match family {
            OsFamily::Windows if wide => Self::Win64,
            OsFamily::Windows => Self::Win32,
            OsFamily::Linux if wide => Self::Glnxa64,
            OsFamily::Linux => Self::Glnx86,
            OsFamily::MacOs if arm => Self::Maca64,
            OsFamily::MacOs => Self::Maci64,
        }
    }

    /// OS family this architecture belongs to.
    pub fn family(&self) -> OsFamily {
        match self {
            Self::Win64 | Self::Win32 => OsFamily::Windows,
            Self::Glnxa64 | Self::Glnx86 => OsFamily::Linux,
            Self::Maci64 | Self::Maca64 => OsFamily::MacOs,
        }
    }

    /// MATLAB's name for this architecture.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win64 => "win64",
            Self::Win32 => "win32",
            Self::Glnxa64 => "glnxa64",
            Self::Glnx86 => "glnx86",
            Self::Maci64 => "maci64",
            Self::Maca64 => "maca64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|arch| arch.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RuntimeError::UnsupportedPlatform {
                platform: s.to_string(),
            })
    }
}
