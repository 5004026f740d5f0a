//! Launcher option extraction
//!
//! flyenv recognizes exactly two global flags of its own; everything else on
//! the command line belongs to fly and is forwarded verbatim. Parsing
//! therefore runs with `ignore_errors` so unknown fly options and commands
//! never trip the launcher, and the original argv is what gets forwarded -
//! these options are only peeked at, never consumed.

use clap::Parser;
use std::ffi::OsString;

/// Options flyenv itself understands.
#[derive(Parser, Debug, Default)]
#[command(
    name = "flyenv",
    disable_help_flag = true,
    disable_version_flag = true,
    ignore_errors = true
)]
pub struct Options {
    /// Concourse target name
    #[arg(short = 't', long = "target")]
    pub target: Option<String>,

    /// Print the version of fly and exit
    #[arg(short = 'v', long = "version")]
    pub report_version: bool,

    /// Arguments belonging to fly; collected only so clap keeps scanning,
    /// the original argv is forwarded as-is
    #[arg(hide = true)]
    pub passthrough: Vec<OsString>,
}

impl Options {
    /// Extract flyenv's options from a full argv (including program name).
    pub fn from_argv(argv: &[OsString]) -> Self {
        Self::parse_from(argv.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_no_flags() {
        let opts = Options::from_argv(&argv(&["flyenv"]));
        assert_eq!(opts.target, None);
        assert!(!opts.report_version);
    }

    #[test]
    fn test_target_short_flag() {
        let opts = Options::from_argv(&argv(&["flyenv", "-t", "ci", "builds"]));
        assert_eq!(opts.target.as_deref(), Some("ci"));
        assert!(!opts.report_version);
    }

    #[test]
    fn test_target_long_flag() {
        let opts = Options::from_argv(&argv(&["flyenv", "--target=ci", "sync"]));
        assert_eq!(opts.target.as_deref(), Some("ci"));
    }

    #[test]
    fn test_version_flag() {
        let opts = Options::from_argv(&argv(&["flyenv", "-v"]));
        assert!(opts.report_version);
        assert_eq!(opts.target, None);
    }

    #[test]
    fn test_unknown_arguments_ignored() {
        let opts = Options::from_argv(&argv(&["flyenv", "-t", "ci", "set-pipeline"]));
        assert_eq!(opts.target.as_deref(), Some("ci"));
    }

    #[test]
    fn test_bare_subcommand_ignored() {
        let opts = Options::from_argv(&argv(&["flyenv", "builds"]));
        assert_eq!(opts.target, None);
        assert!(!opts.report_version);
    }
}
