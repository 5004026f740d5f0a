//! Target configuration from `~/.flyrc`
//!
//! fly keeps its saved targets in a YAML file in the user's home directory.
//! flyenv only reads the fields that matter for an unauthenticated version
//! handshake: the API URL and the TLS trust settings. Tokens, team names and
//! anything else fly stores there are left alone.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Name of fly's target configuration file under the user's home
const FLYRC_FILE_NAME: &str = ".flyrc";

/// A saved Concourse target, as far as flyenv cares about it.
#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    /// Base API URL of the Concourse instance
    pub api: String,

    /// Skip TLS certificate verification when talking to this target
    #[serde(default)]
    pub insecure: bool,

    /// PEM-encoded CA certificate to trust for this target
    #[serde(default)]
    pub ca_cert: Option<String>,
}

impl Target {
    /// API URL without a trailing slash, ready for path concatenation.
    pub fn url(&self) -> &str {
        self.api.trim_end_matches('/')
    }

    /// Build an unauthenticated HTTP agent honoring this target's TLS trust
    /// settings. `force_insecure` additionally disables certificate
    /// verification regardless of the saved configuration.
    pub(crate) fn http_agent(
        &self,
        force_insecure: bool,
        timeout: std::time::Duration,
    ) -> Result<ureq::Agent> {
        let mut tls = native_tls::TlsConnector::builder();

        if self.insecure || force_insecure {
            tls.danger_accept_invalid_certs(true);
        }
        if let Some(pem) = &self.ca_cert {
            let cert = native_tls::Certificate::from_pem(pem.as_bytes())
                .context("invalid ca_cert in .flyrc")?;
            tls.add_root_certificate(cert);
        }

        let connector = tls.build().context("failed to build TLS connector")?;
        Ok(ureq::AgentBuilder::new()
            .timeout(timeout)
            .tls_connector(std::sync::Arc::new(connector))
            .build())
    }
}

#[derive(Debug, Deserialize)]
struct FlyRc {
    #[serde(default)]
    targets: BTreeMap<String, Target>,
}

/// Look up a named target in `~/.flyrc`.
///
/// An unknown target name, or no `.flyrc` at all, is an expected condition
/// and returns `Ok(None)`; an unreadable or unparseable file is an error.
pub fn load_target(name: &str) -> Result<Option<Target>> {
    let flyrc_path = crate::cache::user_home_dir()?.join(FLYRC_FILE_NAME);
    load_target_from(&flyrc_path, name)
}

/// Look up a named target in an explicit flyrc file.
pub fn load_target_from(flyrc_path: &Path, name: &str) -> Result<Option<Target>> {
    if !flyrc_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(flyrc_path)
        .with_context(|| format!("cannot read {}", flyrc_path.display()))?;
    let flyrc: FlyRc = serde_yaml::from_str(&content)
        .with_context(|| format!("cannot parse {}", flyrc_path.display()))?;

    Ok(flyrc.targets.get(name).cloned())
}
