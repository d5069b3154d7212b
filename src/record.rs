//! Per-package state carried through a run

use std::path::PathBuf;

use serde::Serialize;

/// Everything known about one discovered nested package
///
/// Built during inspection, mutated by the relocation transaction (manifest
/// snapshot fields), and written to the forensic backup file inside the
/// holding directory before any rename happens.
#[derive(Debug, Clone, Serialize)]
pub struct PackageRecord {
    /// Package identifier, the directory name under node_modules
    pub name: String,

    /// Absolute path to the package directory
    pub path: PathBuf,

    /// True when any non-ignored git status entry was reported
    pub dirty: bool,

    /// One "path: labels" line per non-ignored status entry
    pub change_messages: Vec<String>,

    /// Permanent location of the `.git` directory
    pub metadata_original: PathBuf,

    /// Temporary location under the holding directory
    pub metadata_relocated: PathBuf,

    /// A uniquely-suffixed holding path was pre-created for a name collision
    pub created_relocation_parent: bool,

    /// Version declared in the package's own manifest
    pub version: String,

    /// Raw manifest text, snapshotted only when devDependencies were merged
    #[serde(skip)]
    pub manifest_backup: Option<String>,

    /// Path of the rewritten package manifest, set together with the backup
    pub manifest_path: Option<PathBuf>,
}
