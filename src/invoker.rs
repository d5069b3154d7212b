//! npm subprocess invocation
//!
//! Runs npm with the exact arguments the user gave ginstall, streams wired
//! straight through so prompts and progress bars behave as usual, and blocks
//! until it exits. No timeout: installs may legitimately run long.

use std::process::{Command, ExitStatus, Stdio};

use crate::context::RunContext;
use crate::error::{GinstallError, Result};

/// Run npm in the workspace root, inheriting stdio, and wait for it
pub fn run_npm(ctx: &RunContext) -> Result<ExitStatus> {
    Command::new(&ctx.npm_program)
        .args(&ctx.npm_args)
        .current_dir(&ctx.root)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| GinstallError::NpmLaunchFailed {
            program: ctx.npm_program.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })
}
