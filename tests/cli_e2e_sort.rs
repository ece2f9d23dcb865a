//! End-to-end tests for the `sfdx-meta sort` command.

mod common;
use common::prelude::*;

const UNSORTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Package xmlns="http://soap.sforce.com/2006/04/metadata">
    <types>
        <members>Zeta</members>
        <members>Alpha</members>
        <members>Zeta</members>
        <name>ApexClass</name>
    </types>
    <types>
        <members>Onboarding</members>
        <name>Flow</name>
    </types>
    <types>
        <members>Account</members>
        <name>CustomObject</name>
    </types>
    <version>58.0</version>
</Package>
"#;

const SORTED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Package xmlns="http://soap.sforce.com/2006/04/metadata">
    <types>
        <members>Alpha</members>
        <members>Zeta</members>
        <name>ApexClass</name>
    </types>
    <types>
        <members>Account</members>
        <name>CustomObject</name>
    </types>
    <types>
        <members>Onboarding</members>
        <name>Flow</name>
    </types>
    <version>58.0</version>
</Package>
"#;

#[test]
fn test_sort_in_place() {
    let fixture = TestFixture::new().with_file("package.xml", UNSORTED);

    fixture
        .command()
        .args(["sort", "package.xml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorted 3 type(s)"));

    assert_eq!(fixture.read("package.xml"), SORTED);
}

#[test]
fn test_sort_to_other_file_leaves_input() {
    let fixture = TestFixture::new().with_file("package.xml", UNSORTED);

    fixture
        .command()
        .args(["sort", "package.xml", "-o", "sorted/package.xml"])
        .assert()
        .success();

    assert_eq!(fixture.read("package.xml"), UNSORTED);
    assert_eq!(fixture.read("sorted/package.xml"), SORTED);
}

#[test]
fn test_sort_is_idempotent() {
    let fixture = TestFixture::new().with_file("package.xml", SORTED);

    fixture.command().args(["sort", "package.xml"]).assert().success();

    assert_eq!(fixture.read("package.xml"), SORTED);
}

#[test]
fn test_sort_rejects_non_package_root() {
    let fixture = TestFixture::new().with_file("package.xml", "<CustomObject/>");

    fixture
        .command()
        .args(["sort", "package.xml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected root element <Package>"));
}
