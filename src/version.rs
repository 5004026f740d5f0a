//! Version identifiers
//!
//! A version is an opaque dotted release string such as `7.9.0`. It names a
//! cache directory and appears in download URLs; flyenv never compares or
//! orders versions.

use std::fmt;

use anyhow::{bail, Result};

/// An opaque release version, normalized to have no leading tag prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version(String);

impl Version {
    /// Parse a version from a tag or version string, stripping a leading `v`.
    ///
    /// # Example
    /// ```
    /// use flyenv::version::Version;
    /// assert_eq!(Version::parse("v7.9.0").unwrap().as_str(), "7.9.0");
    /// ```
    pub fn parse(tag: &str) -> Result<Self> {
        let normalized = tag.strip_prefix('v').unwrap_or(tag);
        if normalized.is_empty() {
            bail!("empty version string");
        }
        Ok(Self(normalized.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
