//! End-to-end tests for the `sfdx-meta completions` command.

mod common;
use common::prelude::*;

#[test]
fn test_completions_help() {
    cargo_bin_cmd!("sfdx-meta")
        .args(["completions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("bash"))
        .stdout(predicate::str::contains("powershell"));
}

#[test]
fn test_completions_bash() {
    cargo_bin_cmd!("sfdx-meta")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_sfdx-meta()"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_completions_zsh() {
    cargo_bin_cmd!("sfdx-meta")
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef sfdx-meta"));
}

#[test]
fn test_completions_ignore_broken_settings() {
    let fixture = TestFixture::new().with_settings("not: [valid\n");

    fixture
        .command()
        .args(["completions", "fish"])
        .assert()
        .success();
}

#[test]
fn test_completions_invalid_shell() {
    cargo_bin_cmd!("sfdx-meta")
        .args(["completions", "tcsh"])
        .assert()
        .code(2);
}
