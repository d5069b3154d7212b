//! Relocation transaction over nested git checkouts
//!
//! The all-or-nothing sequence at the heart of ginstall: pin every discovered
//! package in the root manifest, rename each `.git` directory into the holding
//! directory, and - whatever happens afterward - put it all back.
//!
//! Committing is fail-fast: the first rename or manifest write that fails
//! stops the loop, and only the prefix processed so far is remembered for
//! rollback. Rollback is the opposite: every committed record gets a
//! restoration attempt even when an earlier one fails.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use crate::context::{MANIFEST_FILE, RunContext};
use crate::error::{GinstallError, Result};
use crate::inspector;
use crate::manifest::Manifest;
use crate::record::PackageRecord;
use crate::scanner;

/// Forensic backup filename inside the holding directory
pub const BACKUP_FILE: &str = "relocations.json";

/// State for one relocation transaction
#[derive(Debug)]
pub struct RelocationTransaction<'a> {
    ctx: &'a RunContext,

    /// Records in discovery order
    records: Vec<PackageRecord>,

    /// How many records were committed (renamed); rollback undoes exactly
    /// this prefix
    committed: usize,

    /// Raw root manifest text, present once the root manifest was mutated
    root_manifest_backup: Option<String>,

    /// A rollback or cleanup step failed; diagnostic state stays on disk
    errored: bool,
}

impl<'a> RelocationTransaction<'a> {
    /// Collecting phase: scan the workspace and inspect every package
    ///
    /// Holding targets are allocated up front, sequentially, so that two
    /// packages with the same name get distinct paths; inspections then run
    /// concurrently.
    pub fn collect(ctx: &'a RunContext) -> Result<Self> {
        let packages: Vec<scanner::DiscoveredPackage> = scanner::packages(&ctx.root).collect();

        let mut claimed = HashSet::new();
        let mut targets = Vec::with_capacity(packages.len());
        for pkg in &packages {
            targets.push(allocate_target(&ctx.holding_root, &pkg.name, &mut claimed)?);
        }

        let inspections = inspector::inspect_all(&packages)?;

        let records = packages
            .into_iter()
            .zip(inspections)
            .zip(targets)
            .map(|((pkg, inspection), (relocated, created))| PackageRecord {
                name: pkg.name,
                path: pkg.path,
                dirty: inspection.dirty,
                change_messages: inspection.change_messages,
                metadata_original: pkg.metadata_dir,
                metadata_relocated: relocated,
                created_relocation_parent: created,
                version: inspection.version,
                manifest_backup: None,
                manifest_path: None,
            })
            .collect();

        Ok(Self {
            ctx,
            records,
            committed: 0,
            root_manifest_backup: None,
            errored: false,
        })
    }

    pub fn records(&self) -> &[PackageRecord] {
        &self.records
    }

    /// The packages that block the run
    pub fn dirty_records(&self) -> Vec<&PackageRecord> {
        self.records.iter().filter(|r| r.dirty).collect()
    }

    /// True when every record was committed and npm may run
    pub fn fully_committed(&self) -> bool {
        self.committed == self.records.len()
    }

    pub fn errored(&self) -> bool {
        self.errored
    }

    /// Write the forensic backup file into the holding directory
    ///
    /// Written before any rename, so a crash mid-commit leaves a map from
    /// relocated paths back to their packages.
    pub fn write_backup_file(&self) -> Result<()> {
        let path = self.ctx.holding_root.join(BACKUP_FILE);
        let text = serde_json::to_string_pretty(&self.records).map_err(|e| {
            GinstallError::ManifestWriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        fs::write(&path, text)?;
        Ok(())
    }

    /// Committing phase: pin versions in the root manifest, then relocate
    /// each package's metadata in discovery order
    ///
    /// Stops at the first failure; the committed prefix stays relocated until
    /// `rollback` runs.
    pub fn commit(&mut self) -> Result<()> {
        self.patch_root_manifest()?;

        for index in 0..self.records.len() {
            self.relocate_record(index)?;
            // The rename landed; from here on this record must be restored by
            // rollback even if the manifest step below fails.
            self.committed = index + 1;
            self.merge_record_manifest(index)?;
        }

        Ok(())
    }

    /// Pin `dependencies[name] = version` for every record so npm treats the
    /// checkouts as already-satisfied dependencies
    fn patch_root_manifest(&mut self) -> Result<()> {
        let mut manifest = Manifest::load(&self.ctx.root_manifest())?;
        self.root_manifest_backup = Some(manifest.raw().to_string());

        for record in &self.records {
            manifest.pin_dependency(&record.name, &record.version);
        }

        manifest.write()
    }

    fn relocate_record(&mut self, index: usize) -> Result<()> {
        let record = &self.records[index];

        // A collision target was pre-created as an empty placeholder; renaming
        // over an existing directory is not portable, so clear it first.
        if record.created_relocation_parent && record.metadata_relocated.exists() {
            fs::remove_dir(&record.metadata_relocated)?;
        }

        println!(
            "Moving {} to {}",
            record.metadata_original.display(),
            record.metadata_relocated.display()
        );
        fs::rename(&record.metadata_original, &record.metadata_relocated).map_err(|e| {
            GinstallError::RenameFailed {
                from: record.metadata_original.display().to_string(),
                to: record.metadata_relocated.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn merge_record_manifest(&mut self, index: usize) -> Result<()> {
        let record = &mut self.records[index];

        // With .git hidden, npm may re-resolve the package's own dependency
        // tree; devDependencies of a checkout under active development must
        // stay installable, so they are merged in for the duration.
        let manifest_path = record.path.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let mut manifest = Manifest::load(&manifest_path)?;
            if manifest.has_dev_dependencies() {
                println!(
                    "Temporarily adding devDependencies to dependencies in {}",
                    manifest_path.display()
                );
                record.manifest_backup = Some(manifest.raw().to_string());
                record.manifest_path = Some(manifest_path);
                manifest.merge_dev_dependencies();
                manifest.write()?;
            }
        }

        Ok(())
    }

    /// RollingBack phase: restore the root manifest, then undo the committed
    /// prefix in commit order
    ///
    /// Never stops early; each failure is logged and marks the run errored.
    pub fn rollback(&mut self) {
        if let Some(original) = self.root_manifest_backup.take() {
            if let Err(e) = Manifest::write_raw(&self.ctx.root_manifest(), &original) {
                eprintln!("** Error while restoring root manifest: {}", e);
                self.errored = true;
            }
        }

        for record in &mut self.records[..self.committed] {
            if let (Some(original), Some(path)) =
                (record.manifest_backup.take(), record.manifest_path.as_ref())
            {
                println!("Restoring original {}", path.display());
                if let Err(e) = Manifest::write_raw(path, &original) {
                    eprintln!("** Error while restoring {}: {}", path.display(), e);
                    self.errored = true;
                }
            }

            println!(
                "Returning {} to {}",
                record.metadata_relocated.display(),
                record.metadata_original.display()
            );
            if let Err(e) = fs::rename(&record.metadata_relocated, &record.metadata_original) {
                eprintln!(
                    "** Error while renaming {} back to {}: {}",
                    record.metadata_relocated.display(),
                    record.metadata_original.display(),
                    e
                );
                self.errored = true;
            }
        }
    }

    /// Cleanup phase: drop never-used collision placeholders and, if nothing
    /// went wrong, the holding directory itself
    pub fn cleanup(&mut self) {
        for record in &self.records[self.committed..] {
            if !record.created_relocation_parent {
                continue;
            }
            if let Err(e) = fs::remove_dir(&record.metadata_relocated) {
                eprintln!(
                    "** Error while removing {}: {}",
                    record.metadata_relocated.display(),
                    e
                );
                self.errored = true;
            }
        }

        // On an errored run the backup file stays with the holding root: it
        // maps each parked metadata directory back to its package.
        if !self.errored {
            let backup = self.ctx.holding_root.join(BACKUP_FILE);
            if backup.is_file() {
                if let Err(e) = fs::remove_file(&backup) {
                    eprintln!("** Error while removing {}: {}", backup.display(), e);
                    self.errored = true;
                }
            }
        }

        if !self.errored {
            if let Err(e) = fs::remove_dir(&self.ctx.holding_root) {
                eprintln!(
                    "** Error while removing {}: {}",
                    self.ctx.holding_root.display(),
                    e
                );
                self.errored = true;
            }
        }
    }
}

/// Pick the holding path for one package's metadata
///
/// First claim on a name gets `holding_root/name` (created later by the
/// rename itself); any further claim gets a uniquely-suffixed directory that
/// exists from this point on and must be cleaned up if never used.
fn allocate_target(
    holding_root: &Path,
    name: &str,
    claimed: &mut HashSet<String>,
) -> Result<(PathBuf, bool)> {
    let default = holding_root.join(name);
    if claimed.insert(name.to_string()) && !default.exists() {
        return Ok((default, false));
    }

    let suffixed = Builder::new()
        .prefix(&format!("{name}-"))
        .tempdir_in(holding_root)
        .map_err(|e| GinstallError::HoldingDirFailed {
            path: holding_root.display().to_string(),
            reason: e.to_string(),
        })?
        .keep();

    Ok((suffixed, true))
}
