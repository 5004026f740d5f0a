//! Binary download strategies
//!
//! Two ways a fly binary reaches the cache: the generic release archive
//! published on GitHub (tar.gz or zip depending on platform, goes through
//! the extractor), and a target's own `/api/v1/cli` endpoint (always a raw
//! binary, streamed straight to disk). Both build their URLs from the
//! [`crate::platform`] capability table.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::cache;
use crate::extract;
use crate::flyrc::Target;
use crate::output;
use crate::platform::{ArchiveFormat, Platform};
use crate::version::Version;

/// Base URL of Concourse release downloads
const RELEASE_DOWNLOAD_BASE: &str = "https://github.com/concourse/concourse/releases/download";

/// Timeout for binary downloads (5 minutes)
const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Opt-in environment toggle disabling TLS verification for target downloads
pub const SKIP_SSL_ENV: &str = "FLYENV_SKIP_SSL";

/// Release-archive URL for a version and platform, e.g.
/// `.../download/v7.9.0/fly-7.9.0-linux-amd64.tgz`.
fn release_url(base: &str, version: &Version, platform: Platform) -> String {
    format!(
        "{}/v{}/fly-{}-{}",
        base,
        version,
        version,
        platform.release_suffix()
    )
}

/// Direct binary-download URL served by a target.
fn target_cli_url(target: &Target, platform: Platform) -> String {
    format!(
        "{}/api/v1/cli?arch=amd64&platform={}",
        target.url(),
        platform.api_name()
    )
}

/// Download the generic release archive for `version` and extract the fly
/// binary into `dest_dir`. Returns the extracted path.
pub fn fetch_bundled(version: &Version, platform: Platform, dest_dir: &Path) -> Result<PathBuf> {
    fetch_bundled_with_base(RELEASE_DOWNLOAD_BASE, version, platform, dest_dir)
}

/// Internal: bundled fetch with configurable base URL (for testing)
pub fn fetch_bundled_with_base(
    base: &str,
    version: &Version,
    platform: Platform,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let url = release_url(base, version, platform);
    output::detail(&format!("downloading fly cli from {}", url));

    let response = ureq::get(&url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .call()
        .map_err(|e| anyhow!("error downloading fly cli: {}", e))?;

    let pb = output::create_spinner(&format!("downloading fly {}", version));
    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let reader = pb.wrap_read(response.into_reader());
    let result = match platform.archive_format() {
        ArchiveFormat::TarGz => extract::extract_tar_gz(reader, platform.binary_name(), dest_dir),
        ArchiveFormat::Zip => extract::extract_zip(reader, platform.binary_name(), dest_dir),
    };

    pb.finish_and_clear();
    result
}

/// Download the raw fly binary a target serves into `dest_dir`, unless the
/// binary is already cached there (idempotent no-op). Returns the binary
/// path either way.
pub fn fetch_from_target(target: &Target, platform: Platform, dest_dir: &Path) -> Result<PathBuf> {
    let binary_name = platform.binary_name();
    if cache::binary_installed(dest_dir, binary_name) {
        return Ok(dest_dir.join(binary_name));
    }

    let url = target_cli_url(target, platform);
    output::detail(&format!("downloading fly cli from {}", url));

    let skip_ssl = std::env::var_os(SKIP_SSL_ENV).is_some();
    if skip_ssl {
        output::warning("FLYENV_SKIP_SSL set: skipping TLS certificate verification");
    }

    let agent = target.http_agent(skip_ssl, Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))?;
    let response = agent
        .get(&url)
        .call()
        .map_err(|e| anyhow!("error downloading fly cli: {}", e))?;

    let pb = output::create_spinner("downloading fly");
    if let Some(len) = response
        .header("content-length")
        .and_then(|s| s.parse().ok())
    {
        output::upgrade_to_bytes(&pb, len);
    }

    let reader = pb.wrap_read(response.into_reader());
    let result = cache::install_raw(reader, binary_name, dest_dir);

    pb.finish_and_clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_release_url_linux() {
        let url = release_url("https://example.com/dl", &version("7.9.0"), Platform::Linux);
        assert_eq!(url, "https://example.com/dl/v7.9.0/fly-7.9.0-linux-amd64.tgz");
    }

    #[test]
    fn test_release_url_darwin() {
        let url = release_url("https://example.com/dl", &version("7.9.0"), Platform::Darwin);
        assert_eq!(url, "https://example.com/dl/v7.9.0/fly-7.9.0-darwin-amd64.tgz");
    }

    #[test]
    fn test_release_url_windows_uses_zip() {
        let url = release_url("https://example.com/dl", &version("7.9.0"), Platform::Windows);
        assert_eq!(url, "https://example.com/dl/v7.9.0/fly-7.9.0-windows-amd64.zip");
    }

    #[test]
    fn test_target_cli_url() {
        let target = Target {
            api: "https://ci.example.com/".to_string(),
            insecure: false,
            ca_cert: None,
        };
        assert_eq!(
            target_cli_url(&target, Platform::Linux),
            "https://ci.example.com/api/v1/cli?arch=amd64&platform=linux"
        );
    }

    #[test]
    fn test_fetch_from_target_is_noop_when_installed() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("fly"), "already here").unwrap();

        // Target URL is unreachable; the call must not touch the network.
        let target = Target {
            api: "http://127.0.0.1:1".to_string(),
            insecure: false,
            ca_cert: None,
        };

        let path = fetch_from_target(&target, Platform::Linux, temp.path()).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"already here".to_vec());
    }
}
