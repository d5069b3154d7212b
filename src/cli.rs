//! CLI definitions using clap derive API
//!
//! The surface is deliberately thin: everything after the ginstall options is
//! forwarded to npm verbatim, hyphens included, so `ginstall install`,
//! `ginstall ci --ignore-scripts` and friends behave exactly like the npm
//! invocation they wrap.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};
use std::ffi::OsString;
use std::path::PathBuf;

/// ginstall - npm wrapper that protects nested git checkouts
#[derive(Parser, Debug)]
#[command(
    name = "ginstall",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Run npm while hiding git checkouts inside node_modules from it",
    long_about = "ginstall relocates the .git directory of every package checkout nested under \
                  node_modules, pins those packages' versions in the root package.json so npm \
                  leaves them alone, runs npm with your arguments, and restores everything \
                  afterward - even when the install fails.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  ginstall install                \x1b[90m# npm install with checkouts protected\x1b[0m\n   \
                  ginstall ci --ignore-scripts    \x1b[90m# any npm arguments pass through\x1b[0m\n   \
                  ginstall install left-pad@1.3.0 \x1b[90m# add a dependency without touching checkouts\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to current directory)
    #[arg(long, short = 'w', env = "GINSTALL_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Arguments forwarded to npm unchanged
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "NPM_ARGS"
    )]
    pub npm_args: Vec<OsString>,
}
