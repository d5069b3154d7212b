//! ginstall - npm wrapper that protects nested git checkouts
//!
//! Packages under node_modules that are themselves git checkouts (under active
//! local development) would otherwise be overwritten or "upgraded" by npm.
//! ginstall hides their .git directories for the duration of the install, pins
//! their versions in the root package.json, runs npm, and restores everything
//! afterward - including when the install fails.

use clap::Parser;

mod cli;
mod context;
mod error;
mod inspector;
mod invoker;
mod lock;
mod manifest;
mod record;
mod relocation;
mod run;
mod scanner;

use cli::Cli;
use context::RunContext;

fn main() {
    let cli = Cli::parse();

    let ctx = match RunContext::new(cli.workspace, cli.npm_args) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match run::run(&ctx) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
