//! End-to-end launch flow
//!
//! Resolution, cache population and process replacement in one place. The
//! launcher never terminates the process itself; it returns the exit code
//! the binary entry point should propagate, and every failure bubbles up as
//! an error for the entry point to report.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::cache::{self, CacheLayout};
use crate::cli::Options;
use crate::fetch;
use crate::flyrc::Target;
use crate::lock;
use crate::platform::Platform;
use crate::resolve;
use crate::version::Version;

/// Suffix appended to fly's version output to mark a wrapped invocation
const VERSION_SUFFIX: &str = "-flyenv";

/// A configured launcher. Defaults talk to the real GitHub and read the
/// real `~/.flyrc`; tests swap in their own endpoints and cache root.
#[derive(Debug)]
pub struct Launcher {
    layout: CacheLayout,
    platform: Platform,
    github_api_base: Option<String>,
    release_base: Option<String>,
    flyrc_path: Option<PathBuf>,
}

impl Launcher {
    pub fn new(layout: CacheLayout, platform: Platform) -> Self {
        Self {
            layout,
            platform,
            github_api_base: None,
            release_base: None,
            flyrc_path: None,
        }
    }

    /// Launcher for the current platform and the user's home cache.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(CacheLayout::from_home()?, Platform::current()?))
    }

    /// Override the GitHub API base URL (for testing).
    pub fn with_github_api_base(mut self, base: impl Into<String>) -> Self {
        self.github_api_base = Some(base.into());
        self
    }

    /// Override the release-download base URL (for testing).
    pub fn with_release_base(mut self, base: impl Into<String>) -> Self {
        self.release_base = Some(base.into());
        self
    }

    /// Override the flyrc location (for testing).
    pub fn with_flyrc(mut self, path: impl Into<PathBuf>) -> Self {
        self.flyrc_path = Some(path.into());
        self
    }

    /// Run the whole launch flow for `argv` and return the exit code to
    /// propagate.
    pub fn run(&self, argv: &[OsString]) -> Result<i32> {
        let binary_name = self.platform.binary_name();

        // Make sure the generic binary is available before anything else,
        // so even a botched target resolution leaves a usable fallback.
        let bundled_dir = self.layout.bundled_dir();
        cache::ensure_dir(&bundled_dir)?;
        {
            let _lock = lock::acquire_dir_lock(&bundled_dir)?;
            if !cache::binary_installed(&bundled_dir, binary_name) {
                let version = self.latest_release()?;
                self.fetch_bundled(&version, &bundled_dir)?;
            }
        }
        let mut fly_path = bundled_dir.join(binary_name);

        let opts = Options::from_argv(argv);

        if let Some(name) = &opts.target {
            if let Some((target, version)) = self.resolve_target(name)? {
                let version_dir = self.layout.version_dir(&version);
                cache::ensure_dir(&version_dir)?;
                let _lock = lock::acquire_dir_lock(&version_dir)?;
                fetch::fetch_from_target(&target, self.platform, &version_dir)?;
                fly_path = version_dir.join(binary_name);
            }
        }

        let (code, captured) = exec_wrapped(&fly_path, argv, opts.report_version)?;

        if let Some(banner) = version_report(code, captured.as_deref()) {
            println!("{}", banner);
        }

        Ok(code)
    }

    fn latest_release(&self) -> Result<Version> {
        match &self.github_api_base {
            Some(base) => resolve::latest_release_with_base(base),
            None => resolve::latest_release(),
        }
    }

    fn fetch_bundled(&self, version: &Version, dest_dir: &Path) -> Result<PathBuf> {
        match &self.release_base {
            Some(base) => fetch::fetch_bundled_with_base(base, version, self.platform, dest_dir),
            None => fetch::fetch_bundled(version, self.platform, dest_dir),
        }
    }

    fn resolve_target(&self, name: &str) -> Result<Option<(Target, Version)>> {
        match &self.flyrc_path {
            Some(path) => resolve::resolve_for_target_from(path, name),
            None => resolve::resolve_for_target(name),
        }
    }
}

/// Spawn the wrapped binary with the launcher's own argv tail and stdio.
/// With `capture_stdout` the child's standard output is collected instead
/// of forwarded. Returns the child's exit code and any captured output.
pub fn exec_wrapped(
    binary: &Path,
    argv: &[OsString],
    capture_stdout: bool,
) -> Result<(i32, Option<String>)> {
    let mut cmd = Command::new(binary);
    if argv.len() > 1 {
        cmd.args(&argv[1..]);
    }

    if capture_stdout {
        let output = cmd
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("error running {}", binary.display()))?;
        let captured = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok((output.status.code().unwrap_or(1), Some(captured)))
    } else {
        let status = cmd
            .status()
            .with_context(|| format!("error running {}", binary.display()))?;
        Ok((status.code().unwrap_or(1), None))
    }
}

/// Tag captured version output as a wrapped invocation.
pub fn version_banner(captured: &str) -> String {
    format!("{}{}", captured.trim_end_matches(['\n', '\r']), VERSION_SUFFIX)
}

/// Banner for a version-report run. Only a child that exited cleanly
/// produces one; a failed fly run propagates its exit code with nothing
/// appended.
pub fn version_report(code: i32, captured: Option<&str>) -> Option<String> {
    match captured {
        Some(output) if code == 0 => Some(version_banner(output)),
        _ => None,
    }
}
