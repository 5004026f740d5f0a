//! Version-aware launcher for the Concourse `fly` CLI
//!
//! flyenv makes sure a matching `fly` binary is present locally before every
//! invocation, then hands the whole command line over to it. Binaries are
//! cached under `~/.flyenv`:
//!
//! - `~/.flyenv/bundled/fly` - the latest published release, used when no
//!   Concourse target is named
//! - `~/.flyenv/<version>/fly` - one directory per API version, used when a
//!   target is named with `-t` and its reported version is known
//!
//! A populated version directory is never touched again; there is no
//! eviction. Everything flyenv does not recognize on the command line is
//! forwarded verbatim to `fly`, and fly's exit code becomes flyenv's.
//!
//! # Example
//!
//! ```bash
//! flyenv -t ci builds          # runs fly pinned to ci's API version
//! flyenv -v                    # prints "<fly version>-flyenv"
//! ```

pub mod cache;
pub mod cli;
pub mod extract;
pub mod fetch;
pub mod flyrc;
pub mod launcher;
pub mod lock;
pub mod output;
pub mod platform;
pub mod resolve;
pub mod version;
