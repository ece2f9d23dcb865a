//! Shared test utilities for E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_file("src/classes/Foo.cls", "public class Foo {}")
//!         .with_manifest("package.xml", &[("ApexClass", &["Foo"])]);
//!     fixture.command().args(["scan", "src"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::samples;
    pub use super::TestFixture;
}

/// Metadata file contents shared by several tests.
#[allow(dead_code)]
pub mod samples {
    /// `.object` file with fields A, B and C plus one record type.
    pub const ACCOUNT_OBJECT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomObject xmlns="http://soap.sforce.com/2006/04/metadata">
    <fields>
        <fullName>A</fullName>
        <type>Text</type>
    </fields>
    <fields>
        <fullName>B</fullName>
        <type>Text</type>
    </fields>
    <fields>
        <fullName>C</fullName>
        <type>Checkbox</type>
    </fields>
    <label>Account</label>
    <recordTypes>
        <fullName>Business</fullName>
        <active>true</active>
    </recordTypes>
    <sharingModel>ReadWrite</sharingModel>
</CustomObject>
"#;

    /// Aggregate labels file with two labels.
    pub const LABELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CustomLabels xmlns="http://soap.sforce.com/2006/04/metadata">
    <labels>
        <fullName>Greeting</fullName>
        <language>en_US</language>
        <value>Hello</value>
    </labels>
    <labels>
        <fullName>Farewell</fullName>
        <language>en_US</language>
        <value>Bye</value>
    </labels>
</CustomLabels>
"#;

    /// Render a manifest from `(type, members)` pairs, in the given order.
    pub fn manifest(types: &[(&str, &[&str])]) -> String {
        let mut out = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Package xmlns=\"http://soap.sforce.com/2006/04/metadata\">\n",
        );
        for (name, members) in types {
            out.push_str("    <types>\n");
            for member in *members {
                out.push_str(&format!("        <members>{}</members>\n", member));
            }
            out.push_str(&format!("        <name>{}</name>\n", name));
            out.push_str("    </types>\n");
        }
        out.push_str("    <version>59.0</version>\n</Package>\n");
        out
    }
}

/// A temporary project directory with manifests and metadata files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a manifest rendered from `(type, members)` pairs.
    #[allow(dead_code)]
    pub fn with_manifest(self, path: &str, types: &[(&str, &[&str])]) -> Self {
        let content = samples::manifest(types);
        self.with_file(path, &content)
    }

    /// Add a `.sfdx-meta.yaml` settings file.
    #[allow(dead_code)]
    pub fn with_settings(self, content: &str) -> Self {
        self.with_file(".sfdx-meta.yaml", content)
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file below the fixture root.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e))
    }

    /// Create a command running in this fixture's directory, with colours
    /// off and no settings file leaking in from the environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("sfdx-meta");
        cmd.current_dir(self.path())
            .env_remove("SFDX_META_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("src/classes/Foo.cls", "x");
        assert!(fixture.path().join("src/classes/Foo.cls").exists());
    }

    #[test]
    fn test_sample_manifest_shape() {
        let manifest = samples::manifest(&[("ApexClass", &["Foo", "Bar"])]);
        assert!(manifest.contains("<members>Foo</members>"));
        assert!(manifest.contains("<name>ApexClass</name>"));
        assert!(manifest.trim_end().ends_with("</Package>"));
    }
}
