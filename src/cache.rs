//! On-disk binary cache
//!
//! The cache lives under `~/.flyenv`. The `bundled` subdirectory holds the
//! generic latest-release binary; sibling directories named by version hold
//! target-pinned binaries. A directory either contains the binary or is
//! being populated under a [`crate::lock`] guard; populated directories are
//! never updated and never evicted.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::version::Version;

/// Name of the cache root directory under the user's home
const CACHE_DIR_NAME: &str = ".flyenv";

/// Subdirectory holding the generic latest-release binary
const BUNDLED_DIR_NAME: &str = "bundled";

/// Resolve the user's home directory.
///
/// `HOME` wins everywhere; Windows additionally falls back to `USERPROFILE`
/// and `HOMEDRIVE`+`HOMEPATH` before asking the platform.
pub(crate) fn user_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    #[cfg(windows)]
    {
        if let Ok(profile) = std::env::var("USERPROFILE") {
            if !profile.is_empty() {
                return Ok(PathBuf::from(profile));
            }
        }
        if let (Ok(drive), Ok(path)) = (std::env::var("HOMEDRIVE"), std::env::var("HOMEPATH")) {
            if !drive.is_empty() || !path.is_empty() {
                return Ok(PathBuf::from(format!("{}{}", drive, path)));
            }
        }
    }

    dirs::home_dir().context("could not detect home directory for .flyenv")
}

/// Well-known locations of the flyenv cache.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    /// Cache rooted at `<home>/.flyenv`.
    pub fn from_home() -> Result<Self> {
        Ok(Self::new(user_home_dir()?.join(CACHE_DIR_NAME)))
    }

    /// Cache rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the generic latest-release binary.
    pub fn bundled_dir(&self) -> PathBuf {
        self.root.join(BUNDLED_DIR_NAME)
    }

    /// Directory of a target-pinned binary.
    pub fn version_dir(&self, version: &Version) -> PathBuf {
        self.root.join(version.as_str())
    }
}

/// Check whether `dir` already holds the wrapped binary as a regular file.
pub fn binary_installed(dir: &Path, binary_name: &str) -> bool {
    match std::fs::metadata(dir.join(binary_name)) {
        Ok(metadata) => metadata.is_file(),
        Err(_) => false,
    }
}

/// Create a directory (and parents) idempotently.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to set up cache directory {}", dir.display()))
}

/// Populate a cache directory with a raw (non-archived) binary by streaming
/// `reader` into it and marking the result executable.
pub fn install_raw<R: Read>(mut reader: R, binary_name: &str, dir: &Path) -> Result<PathBuf> {
    let output_path = dir.join(binary_name);
    let mut file = std::fs::File::create(&output_path)
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    std::io::copy(&mut reader, &mut file)
        .with_context(|| format!("write error for {}", output_path.display()))?;
    crate::extract::set_executable(&output_path)?;
    Ok(output_path)
}
