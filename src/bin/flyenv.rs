//! flyenv - version-aware launcher for the Concourse fly CLI
//!
//! Usage:
//!   flyenv [fly arguments...]      Run fly, forwarding everything
//!   flyenv -t <target> ...         Pin fly to the target's API version
//!   flyenv -v                      Print fly's version, tagged "-flyenv"
//!
//! This is the single process-exit boundary: library errors surface here
//! and become a message plus a non-zero exit; a fly run that completes
//! propagates fly's own exit code.

use std::ffi::OsString;
use std::process;

use flyenv::launcher::Launcher;
use flyenv::output;

fn main() {
    let argv: Vec<OsString> = std::env::args_os().collect();

    let result = Launcher::from_env().and_then(|launcher| launcher.run(&argv));

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            output::error(&format!("{:#}", err));
            process::exit(1);
        }
    }
}
