//! Orchestration of one ginstall run
//!
//! Wires scanner, inspector, transaction, and npm together:
//! collect -> decide -> commit -> invoke -> rollback -> cleanup.
//! Rollback runs on every path that mutated anything, npm outcome included.

use console::Style;

use crate::context::RunContext;
use crate::error::Result;
use crate::invoker;
use crate::lock::WorkspaceGuard;
use crate::relocation::RelocationTransaction;

/// Exit code for a dirty workspace or an errored rollback
const EXIT_BLOCKED: i32 = 1;

/// Drive a full run; returns the process exit code
pub fn run(ctx: &RunContext) -> Result<i32> {
    let _guard = WorkspaceGuard::acquire(&ctx.root)?;

    let mut tx = match RelocationTransaction::collect(ctx) {
        Ok(tx) => tx,
        Err(e) => {
            // Nothing was mutated; drop the holding root and its collision
            // placeholders instead of leaving an empty ginstall-* directory.
            let _ = std::fs::remove_dir_all(&ctx.holding_root);
            return Err(e);
        }
    };

    // Decision: one dirty package blocks the whole run, before any mutation.
    let dirty = tx.dirty_records();
    if !dirty.is_empty() {
        report_dirty(&dirty);
        tx.cleanup();
        return Ok(EXIT_BLOCKED);
    }

    if let Err(e) = tx.write_backup_file() {
        tx.cleanup();
        return Err(e);
    }

    let commit_result = tx.commit();
    let npm_status = if commit_result.is_ok() {
        debug_assert!(tx.fully_committed());
        println!("Starting npm");
        let status = invoker::run_npm(ctx);
        println!("Done npm");
        Some(status)
    } else {
        None
    };

    tx.rollback();
    tx.cleanup();

    // A commit failure is surfaced only after the best-effort rollback.
    commit_result?;

    Ok(exit_code(&tx, npm_status))
}

fn report_dirty(dirty: &[&crate::record::PackageRecord]) {
    let header = Style::new().yellow().bold();
    let detail = Style::new().dim();

    println!(
        "{}",
        header.apply_to("The following packages have uncommitted changes:")
    );
    for record in dirty {
        println!("  {}", record.path.display());
        for message in &record.change_messages {
            println!("    {}", detail.apply_to(message));
        }
    }
    println!("Please ensure all packages with a git repository have a clean working directory.");
}

/// Exit policy: a failed restoration always wins, otherwise mirror npm
fn exit_code(
    tx: &RelocationTransaction<'_>,
    npm_status: Option<Result<std::process::ExitStatus>>,
) -> i32 {
    if tx.errored() {
        return EXIT_BLOCKED;
    }

    match npm_status {
        Some(Ok(status)) => status.code().unwrap_or(EXIT_BLOCKED),
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            EXIT_BLOCKED
        }
        None => EXIT_BLOCKED,
    }
}
