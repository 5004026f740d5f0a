//! Platform capability table
//!
//! Both fetch paths (release archive and target endpoint) need to know what
//! the current OS is called, which archive format the release ships in, and
//! what the fly binary is named. That knowledge lives in one table here so
//! the two paths cannot drift.

use anyhow::{bail, Result};

/// Archive format used by the generic release download for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

/// One of the three operating systems Concourse publishes fly binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Darwin,
    Windows,
}

impl Platform {
    /// Detect the platform this process is running on.
    ///
    /// Any OS outside the supported set is an error, not a fallback.
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Result<Self> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::Darwin),
            "windows" => Ok(Self::Windows),
            other => bail!("{} is not a supported platform", other),
        }
    }

    /// Platform name as it appears in Concourse download URLs.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Archive format of the generic release download.
    pub fn archive_format(self) -> ArchiveFormat {
        match self {
            Self::Linux | Self::Darwin => ArchiveFormat::TarGz,
            Self::Windows => ArchiveFormat::Zip,
        }
    }

    /// Filename suffix of the generic release asset, e.g. `linux-amd64.tgz`.
    pub fn release_suffix(self) -> &'static str {
        match self {
            Self::Linux => "linux-amd64.tgz",
            Self::Darwin => "darwin-amd64.tgz",
            Self::Windows => "windows-amd64.zip",
        }
    }

    /// Name of the fly binary on this platform.
    pub fn binary_name(self) -> &'static str {
        match self {
            Self::Linux | Self::Darwin => "fly",
            Self::Windows => "fly.exe",
        }
    }
}
