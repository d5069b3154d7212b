//! Repository inspection for discovered packages
//!
//! For each package with a `.git` directory: is the checkout clean, and what
//! version does its manifest declare? Anything git reports for a non-ignored
//! entry counts as uncommitted - untracked, modified, staged, deleted,
//! conflicted.
//!
//! Inspections are read-only and independent, so they run on scoped threads
//! (git2 is blocking) and are joined with a wait-for-all barrier; the caller
//! sees either every result in discovery order or the first failure.

use std::thread;

use git2::{Repository, Status, StatusOptions};
use indicatif::{ProgressBar, ProgressStyle};

use crate::context::MANIFEST_FILE;
use crate::error::{GinstallError, Result};
use crate::manifest::Manifest;
use crate::scanner::DiscoveredPackage;

/// Outcome of inspecting one package
#[derive(Debug, Clone)]
pub struct Inspection {
    /// Any non-ignored status entry was reported
    pub dirty: bool,

    /// One "path: labels" line per reported entry
    pub change_messages: Vec<String>,

    /// Version declared in the package manifest
    pub version: String,
}

/// Human-readable labels for a status bitfield
fn status_labels(status: Status) -> Vec<&'static str> {
    const LABELS: &[(Status, &str)] = &[
        (Status::INDEX_NEW, "staged new"),
        (Status::INDEX_MODIFIED, "staged modified"),
        (Status::INDEX_DELETED, "staged deleted"),
        (Status::INDEX_RENAMED, "staged renamed"),
        (Status::INDEX_TYPECHANGE, "staged typechange"),
        (Status::WT_NEW, "untracked"),
        (Status::WT_MODIFIED, "modified"),
        (Status::WT_DELETED, "deleted"),
        (Status::WT_RENAMED, "renamed"),
        (Status::WT_TYPECHANGE, "typechange"),
        (Status::CONFLICTED, "conflicted"),
    ];

    LABELS
        .iter()
        .filter(|(flag, _)| status.contains(*flag))
        .map(|(_, label)| *label)
        .collect()
}

/// Inspect one package: git status plus declared version
pub fn inspect(pkg: &DiscoveredPackage) -> Result<Inspection> {
    let repo = Repository::open(&pkg.path).map_err(|e| GinstallError::GitOpenFailed {
        path: pkg.path.display().to_string(),
        reason: e.message().to_string(),
    })?;

    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(|e| GinstallError::GitStatusFailed {
            path: pkg.path.display().to_string(),
            reason: e.message().to_string(),
        })?;

    let mut change_messages = Vec::new();
    for entry in statuses.iter() {
        let status = entry.status();
        if status == Status::IGNORED {
            continue;
        }

        let path = entry.path().unwrap_or("<non-utf8 path>");
        change_messages.push(format!("{}: {}", path, status_labels(status).join(", ")));
    }

    let version = package_version(pkg)?;

    Ok(Inspection {
        dirty: !change_messages.is_empty(),
        change_messages,
        version,
    })
}

fn package_version(pkg: &DiscoveredPackage) -> Result<String> {
    let manifest_path = pkg.path.join(MANIFEST_FILE);
    let manifest = Manifest::load(&manifest_path)?;

    manifest
        .version()
        .map(str::to_string)
        .ok_or_else(|| GinstallError::ManifestMissingVersion {
            name: pkg.name.clone(),
            path: manifest_path.display().to_string(),
        })
}

fn inspection_progress(total: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");

    let progress = ProgressBar::new(total);
    progress.set_style(style);
    progress.set_message("inspecting checkouts");
    progress
}

/// Inspect every package concurrently, preserving discovery order
///
/// All inspections run to completion before the first error (if any) is
/// returned, so the decision phase never sees a partial view.
pub fn inspect_all(packages: &[DiscoveredPackage]) -> Result<Vec<Inspection>> {
    let progress = inspection_progress(packages.len() as u64);

    let results: Vec<Result<Inspection>> = thread::scope(|scope| {
        let handles: Vec<_> = packages
            .iter()
            .map(|pkg| {
                let progress = &progress;
                scope.spawn(move || {
                    let result = inspect(pkg);
                    progress.inc(1);
                    result
                })
            })
            .collect();

        handles
            .into_iter()
            .zip(packages)
            .map(|(handle, pkg)| {
                handle
                    .join()
                    .unwrap_or_else(|_| close_panicked_inspection(&pkg.name))
            })
            .collect()
    });

    progress.finish_and_clear();
    results.into_iter().collect()
}

fn close_panicked_inspection(name: &str) -> Result<Inspection> {
    Err(GinstallError::InspectionFailed {
        name: name.to_string(),
        reason: "inspection thread panicked".to_string(),
    })
}
