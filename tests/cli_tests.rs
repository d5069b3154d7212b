//! CLI integration tests using the real ginstall binary

mod common;

use common::ginstall_cmd;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    ginstall_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("node_modules"))
        .stdout(predicate::str::contains("NPM_ARGS"))
        .stdout(predicate::str::contains("--workspace"));
}

#[test]
fn test_version_output() {
    ginstall_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ginstall"));
}

#[test]
fn test_no_arguments_prints_usage_and_fails() {
    ginstall_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_missing_workspace_fails() {
    ginstall_cmd()
        .args(["-w", "/no/such/ginstall/workspace", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Workspace root not found"));
}
