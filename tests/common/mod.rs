//! Common test utilities for ginstall integration tests

// Not every test binary uses every helper
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A test workspace with a root package.json and nested git packages
pub struct TestWorkspace {
    /// Temporary directory, kept alive for the test's duration
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to the workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp
            .path()
            .canonicalize()
            .expect("Failed to canonicalize temp directory");
        Self { temp, path }
    }

    /// Write the root package.json
    pub fn root_manifest(&self, text: &str) {
        fs::write(self.path.join("package.json"), text).expect("Failed to write root manifest");
    }

    pub fn read_root_manifest(&self) -> String {
        fs::read_to_string(self.path.join("package.json")).expect("Failed to read root manifest")
    }

    /// Create a nested package at `rel` (e.g. "node_modules/a") with a git
    /// repository and everything committed
    pub fn git_package(&self, rel: &str, manifest: &str) -> PathBuf {
        let path = self.path.join(rel);
        fs::create_dir_all(&path).expect("Failed to create package directory");
        fs::write(path.join("package.json"), manifest).expect("Failed to write package manifest");
        git2::Repository::init(&path).expect("Failed to init repository");
        commit_all(&path);
        path
    }

    /// Create a nested package directory without a git repository
    #[allow(dead_code)]
    pub fn plain_package(&self, rel: &str, manifest: &str) -> PathBuf {
        let path = self.path.join(rel);
        fs::create_dir_all(&path).expect("Failed to create package directory");
        fs::write(path.join("package.json"), manifest).expect("Failed to write package manifest");
        path
    }

    /// Write an executable fake-npm script and return its path
    ///
    /// The script body runs with the workspace root as working directory,
    /// because the invoker spawns npm there.
    #[cfg(unix)]
    pub fn fake_npm(&self, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.path.join("fake-npm.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write fake npm");
        let mut perms = fs::metadata(&path).expect("Failed to stat fake npm").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("Failed to chmod fake npm");
        path
    }

    /// ginstall command pointed at this workspace and the given npm program
    pub fn ginstall(&self, npm: &Path) -> assert_cmd::Command {
        let mut cmd = ginstall_cmd();
        cmd.current_dir(&self.path).env("GINSTALL_NPM", npm);
        cmd
    }

    /// Snapshot of every file under the workspace, holding dirs excluded,
    /// mapping relative path to content
    pub fn file_snapshot(&self) -> std::collections::BTreeMap<String, Vec<u8>> {
        let mut snapshot = std::collections::BTreeMap::new();
        for entry in collect_files(&self.path) {
            let rel = entry
                .strip_prefix(&self.path)
                .expect("entry under workspace")
                .to_string_lossy()
                .into_owned();
            if rel.starts_with("ginstall-") || rel == "fake-npm.sh" || rel.starts_with("npm-") {
                continue;
            }
            snapshot.insert(rel, fs::read(&entry).expect("Failed to read file"));
        }
        snapshot
    }
}

fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("Failed to read directory") {
            let entry = entry.expect("Failed to read entry");
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Stage and commit everything in a repository
pub fn commit_all(path: &Path) {
    let repo = git2::Repository::open(path).expect("Failed to open repository");
    let mut index = repo.index().expect("Failed to get index");
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .expect("Failed to stage files");
    index.write().expect("Failed to write index");
    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = git2::Signature::now("test", "test@example.com").expect("Failed to create signature");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
        .expect("Failed to commit");
}

/// ginstall command with no workspace defaults applied
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn ginstall_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("ginstall").expect("ginstall binary")
}
