//! Version resolution
//!
//! Answers "which fly version does this invocation need": either the latest
//! published Concourse release (no target named), or whatever API version a
//! named target reports. The target handshake is deliberately
//! unauthenticated - only running fly itself needs credentials.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::flyrc::{self, Target};
use crate::version::Version;

/// Default GitHub API base URL
const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository the generic fly release comes from
const CONCOURSE_REPO: &str = "concourse/concourse";

/// Timeout for version-metadata requests
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Get GitHub token from environment, if set.
/// Tokens increase rate limits from 60/hr to 5000/hr.
fn github_token() -> Option<String> {
    std::env::var("GITHUB_TOKEN").ok()
}

/// Create a GitHub API request builder with proper headers and optional auth.
fn github_request(url: &str) -> ureq::Request {
    let mut request = ureq::get(url)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .set("Accept", "application/vnd.github.v3+json")
        .set("User-Agent", "flyenv");

    if let Some(token) = github_token() {
        request = request.set("Authorization", &format!("Bearer {}", token));
    }

    request
}

/// Get the latest published Concourse release version.
pub fn latest_release() -> Result<Version> {
    latest_release_with_base(GITHUB_API_BASE)
}

/// Internal: latest release with configurable base URL (for testing)
pub fn latest_release_with_base(base_url: &str) -> Result<Version> {
    let url = format!("{}/repos/{}/releases/latest", base_url, CONCOURSE_REPO);

    let response = github_request(&url).call().map_err(|e| match e {
        // A 403 is only a rate limit when the quota is actually spent
        ureq::Error::Status(403, ref resp)
            if resp.header("x-ratelimit-remaining") == Some("0") =>
        {
            anyhow!("GitHub API rate limit exceeded. Try again later or set GITHUB_TOKEN.")
        }
        e => anyhow!("error fetching latest Concourse release: {}", e),
    })?;

    let json: serde_json::Value = response
        .into_json()
        .context("failed to parse GitHub response")?;

    let tag = json
        .get("tag_name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("no tag_name in GitHub response"))?;

    Version::parse(tag)
}

/// Resolve a named target from `~/.flyrc` and the fly version it requires.
///
/// An unknown target name is an expected condition and returns `Ok(None)`;
/// the launcher falls back to the bundled binary. A known target that
/// cannot be reached or reports garbage is an error.
pub fn resolve_for_target(name: &str) -> Result<Option<(Target, Version)>> {
    handshake(flyrc::load_target(name)?)
}

/// Resolve a named target from an explicit flyrc file (for testing).
pub fn resolve_for_target_from(
    flyrc_path: &std::path::Path,
    name: &str,
) -> Result<Option<(Target, Version)>> {
    handshake(flyrc::load_target_from(flyrc_path, name)?)
}

fn handshake(target: Option<Target>) -> Result<Option<(Target, Version)>> {
    let Some(target) = target else {
        return Ok(None);
    };

    let version = target_version(&target)?;
    Ok(Some((target, version)))
}

/// Query the API version a target is running, over an unauthenticated
/// connection that matches the target's configured TLS/CA trust.
pub fn target_version(target: &Target) -> Result<Version> {
    let agent = target.http_agent(false, Duration::from_secs(HTTP_TIMEOUT_SECS))?;
    let url = format!("{}/api/v1/info", target.url());

    let response = agent
        .get(&url)
        .call()
        .map_err(|e| anyhow!("error fetching target version from {}: {}", url, e))?;

    let json: serde_json::Value = response
        .into_json()
        .with_context(|| format!("failed to parse info response from {}", url))?;

    let version = json
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("no version in info response from {}", url))?;

    Version::parse(version)
}
