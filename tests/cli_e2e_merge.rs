//! End-to-end tests for the `sfdx-meta merge` command.

mod common;
use common::prelude::*;

#[test]
fn test_merge_disjoint_manifests() {
    let fixture = TestFixture::new()
        .with_manifest("a.xml", &[("ApexClass", &["Zeta"]), ("Flow", &["Onboarding"])])
        .with_manifest("b.xml", &[("ApexClass", &["Alpha"])]);

    fixture
        .command()
        .args(["merge", "a.xml", "b.xml", "-o", "merged.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 manifest(s)"));

    let merged = fixture.read("merged.xml");
    let alpha = merged.find("<members>Alpha</members>").unwrap();
    let zeta = merged.find("<members>Zeta</members>").unwrap();
    assert!(alpha < zeta);
    assert!(merged.contains("<name>Flow</name>"));
    assert!(merged.contains("<version>59.0</version>"));
}

#[test]
fn test_merge_duplicate_is_reported_not_fatal() {
    let fixture = TestFixture::new()
        .with_manifest("a.xml", &[("ApexClass", &["Foo"])])
        .with_manifest("b.xml", &[("ApexClass", &["Foo", "Bar"])]);

    fixture
        .command()
        .args(["merge", "a.xml", "b.xml", "-o", "merged.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ApexClass: Foo"));

    assert_eq!(
        fixture
            .read("merged.xml")
            .matches("<members>Foo</members>")
            .count(),
        1
    );
}

#[test]
fn test_merge_strict_fails_on_duplicate() {
    let fixture = TestFixture::new()
        .with_manifest("a.xml", &[("ApexClass", &["Foo"])])
        .with_manifest("b.xml", &[("ApexClass", &["Foo"])]);

    fixture
        .command()
        .args(["merge", "a.xml", "b.xml", "-o", "merged.xml", "--strict"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Manifest conflict"))
        .stderr(predicate::str::contains("ApexClass: Foo"));

    fixture.child("merged.xml").assert(predicate::path::missing());
}

#[test]
fn test_merge_strict_with_ignored_type() {
    let fixture = TestFixture::new()
        .with_manifest("a.xml", &[("ApexClass", &["Foo"])])
        .with_manifest("b.xml", &[("ApexClass", &["Foo"])]);

    fixture
        .command()
        .args([
            "merge",
            "a.xml",
            "b.xml",
            "-o",
            "merged.xml",
            "--strict",
            "--ignore-duplicates",
            "ApexClass",
        ])
        .assert()
        .success();
}

#[test]
fn test_merge_wildcard_is_never_a_duplicate() {
    let fixture = TestFixture::new()
        .with_manifest("a.xml", &[("ApexClass", &["*"])])
        .with_manifest("b.xml", &[("ApexClass", &["*"])]);

    fixture
        .command()
        .args(["merge", "a.xml", "b.xml", "-o", "merged.xml", "--strict", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_merge_strict_from_settings_file() {
    let fixture = TestFixture::new()
        .with_settings("merge:\n  fail_on_duplicate: true\n")
        .with_manifest("a.xml", &[("ApexClass", &["Foo"])])
        .with_manifest("b.xml", &[("ApexClass", &["Foo"])]);

    fixture
        .command()
        .args(["merge", "a.xml", "b.xml", "-o", "merged.xml"])
        .assert()
        .code(1);
}
