//! Workspace scanner for nested node_modules trees
//!
//! Walks root/node_modules, each package found there, that package's own
//! node_modules, and so on. Only directories reachable through that
//! alternating chain are visited; everything else in a package (src, dist,
//! ...) is pruned. Yields the packages that carry a `.git` directory.
//!
//! Symlinked packages are skipped outright - following them could loop
//! forever and would relocate metadata out of a tree we do not own.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::context::{DEPENDENCY_DIR, METADATA_DIR};

/// A nested package directory containing version-control metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    /// Package identifier, the directory name under node_modules
    pub name: String,

    /// Absolute path to the package directory
    pub path: PathBuf,

    /// The package's `.git` directory
    pub metadata_dir: PathBuf,
}

fn is_named(entry: &DirEntry, name: &str) -> bool {
    entry.file_name().to_str() == Some(name)
}

fn parent_is_dependency_dir(entry: &DirEntry) -> bool {
    entry
        .path()
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        == Some(DEPENDENCY_DIR)
}

/// Keep only the root, dependency containers, and their direct children
fn on_dependency_chain(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }

    if entry.path_is_symlink() {
        if parent_is_dependency_dir(entry) {
            println!("Skipping symlinked package: {}", entry.path().display());
        }
        return false;
    }

    is_named(entry, DEPENDENCY_DIR) || parent_is_dependency_dir(entry)
}

/// Lazily yield every nested package that has a `.git` directory
///
/// Traversal is sorted by file name, so the order is stable for a fixed tree.
pub fn packages(root: &Path) -> impl Iterator<Item = DiscoveredPackage> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(on_dependency_chain)
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return None;
            }
            if !parent_is_dependency_dir(&entry) {
                return None;
            }

            let metadata_dir = entry.path().join(METADATA_DIR);
            if !metadata_dir.is_dir() {
                return None;
            }

            Some(DiscoveredPackage {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                metadata_dir,
            })
        })
}
