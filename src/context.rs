//! Run context threaded through every phase
//!
//! One `RunContext` is built in `main` and passed by reference everywhere.
//! There is no module-level state: the workspace root, the holding directory
//! for relocated `.git` directories, and the npm invocation all live here.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use normpath::PathExt;
use tempfile::Builder;

use crate::error::{GinstallError, Result};

/// Prefix for the per-run holding directory created at the workspace root
pub const HOLDING_DIR_PREFIX: &str = "ginstall-";

/// Root manifest filename
pub const MANIFEST_FILE: &str = "package.json";

/// Dependency container directory name
pub const DEPENDENCY_DIR: &str = "node_modules";

/// Git metadata directory name
pub const METADATA_DIR: &str = ".git";

/// Immutable state for a single ginstall run
#[derive(Debug)]
pub struct RunContext {
    /// Workspace root (directory holding the root package.json)
    pub root: PathBuf,

    /// Holding directory for relocated metadata, created at the workspace root
    pub holding_root: PathBuf,

    /// Arguments forwarded to npm
    pub npm_args: Vec<OsString>,

    /// Resolved npm program (GINSTALL_NPM override, or platform default)
    pub npm_program: OsString,
}

impl RunContext {
    /// Build the context: resolve the root, create the holding directory
    pub fn new(workspace: Option<PathBuf>, npm_args: Vec<OsString>) -> Result<Self> {
        let root = resolve_root(workspace)?;

        // Unique per run, so parallel runs in sibling workspaces never clash.
        let holding_root = Builder::new()
            .prefix(HOLDING_DIR_PREFIX)
            .tempdir_in(&root)
            .map_err(|e| GinstallError::HoldingDirFailed {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?
            .keep();

        Ok(Self {
            root,
            holding_root,
            npm_args,
            npm_program: npm_program(),
        })
    }

    /// Path to the root manifest
    pub fn root_manifest(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }
}

/// Resolve and normalize the workspace root
///
/// Normalization matters on macOS where the temp root reaches the real
/// filesystem through /var -> /private/var; relocated paths must compare equal
/// to the paths npm sees.
fn resolve_root(workspace: Option<PathBuf>) -> Result<PathBuf> {
    let root = match workspace {
        Some(path) => path,
        None => env::current_dir()?,
    };

    if !root.is_dir() {
        return Err(GinstallError::WorkspaceNotFound {
            path: root.display().to_string(),
        });
    }

    Ok(root
        .normalize()
        .map(|np| np.into_path_buf())
        .unwrap_or(root))
}

/// Resolve the npm program to spawn
fn npm_program() -> OsString {
    if let Some(program) = env::var_os("GINSTALL_NPM") {
        return program;
    }

    if cfg!(windows) {
        OsString::from("npm.cmd")
    } else {
        OsString::from("npm")
    }
}
