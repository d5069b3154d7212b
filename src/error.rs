//! Error types and handling for ginstall
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! A dirty workspace is deliberately not an error variant: it is a normal
//! outcome of the decision phase and is reported by the orchestrator before it
//! declines to mutate anything.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for ginstall operations
#[derive(Error, Diagnostic, Debug)]
pub enum GinstallError {
    // Git errors
    #[error("Failed to open repository at '{path}': {reason}")]
    #[diagnostic(
        code(ginstall::git::open_failed),
        help("The package contains a .git directory but it could not be read as a repository")
    )]
    GitOpenFailed { path: String, reason: String },

    #[error("Failed to read repository status at '{path}': {reason}")]
    #[diagnostic(code(ginstall::git::status_failed))]
    GitStatusFailed { path: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(code(ginstall::git::operation_failed))]
    GitOperationFailed { message: String },

    // Manifest errors
    #[error("Manifest not found: {path}")]
    #[diagnostic(
        code(ginstall::manifest::not_found),
        help("Every package with a git checkout must have a package.json with a version field")
    )]
    ManifestNotFound { path: String },

    #[error("Failed to read manifest: {path}")]
    #[diagnostic(code(ginstall::manifest::read_failed))]
    ManifestReadFailed { path: String, reason: String },

    #[error("Failed to parse manifest: {path}")]
    #[diagnostic(code(ginstall::manifest::parse_failed))]
    ManifestParseFailed { path: String, reason: String },

    #[error("Failed to write manifest: {path}")]
    #[diagnostic(code(ginstall::manifest::write_failed))]
    ManifestWriteFailed { path: String, reason: String },

    #[error("Manifest for '{name}' has no version field: {path}")]
    #[diagnostic(
        code(ginstall::manifest::missing_version),
        help("Add a \"version\" entry to the package's package.json")
    )]
    ManifestMissingVersion { name: String, path: String },

    // Relocation errors
    #[error("Failed to move '{from}' to '{to}': {reason}")]
    #[diagnostic(code(ginstall::relocate::rename_failed))]
    RenameFailed {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Failed to create holding directory under '{path}': {reason}")]
    #[diagnostic(code(ginstall::relocate::holding_dir_failed))]
    HoldingDirFailed { path: String, reason: String },

    #[error("Inspection of '{name}' did not complete: {reason}")]
    #[diagnostic(code(ginstall::inspect::failed))]
    InspectionFailed { name: String, reason: String },

    // Workspace errors
    #[error("Workspace root not found: {path}")]
    #[diagnostic(code(ginstall::workspace::not_found))]
    WorkspaceNotFound { path: String },

    #[error("Failed to lock workspace: {reason}")]
    #[diagnostic(
        code(ginstall::workspace::lock_failed),
        help("Another ginstall run may be active in this workspace")
    )]
    WorkspaceLockFailed { reason: String },

    // Installer errors
    #[error("Failed to launch '{program}': {reason}")]
    #[diagnostic(
        code(ginstall::npm::launch_failed),
        help("Check that npm is installed and on PATH, or set GINSTALL_NPM")
    )]
    NpmLaunchFailed { program: String, reason: String },

    // File system errors
    #[error("IO error: {message}")]
    #[diagnostic(code(ginstall::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for GinstallError {
    fn from(err: std::io::Error) -> Self {
        GinstallError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for GinstallError {
    fn from(err: git2::Error) -> Self {
        GinstallError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, GinstallError>;
