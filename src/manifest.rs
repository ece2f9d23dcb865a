//! # Manifest Reader and Merger
//!
//! Reads `package.xml` manifests and merges several of them into a single
//! [`MemberIndex`], the `type name -> sorted member set` structure shared with
//! the project scanner.
//!
//! ## Merge semantics
//!
//! Manifests are processed in the given order. When a type is already
//! present in the accumulator, the members it has in common with the new
//! block are reported as a [`DuplicateItem`]: error level by default, warning
//! level for types listed in [`MergeOptions::ignored_duplicate_types`]. The
//! wildcard member `*` is never reported. Member sets are unioned either way.
//!
//! In strict mode ([`MergeOptions::fail_on_duplicate`]) any error-level
//! duplicate fails the merge with [`Error::ManifestConflict`].
//!
//! ## Writing
//!
//! [`write_manifest`] renders an index back to the Metadata API format with
//! types and members in lexicographic order, which is also how
//! [`sort_manifest_file`] canonicalizes an existing manifest.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::defaults::{DEFAULT_API_VERSION, METADATA_NAMESPACE};
use crate::error::{Error, Result};
use crate::registry::WILDCARD;
use crate::xml::XmlDocument;

/// Metadata type name to sorted member names.
pub type MemberIndex = BTreeMap<String, BTreeSet<String>>;

/// One parsed manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Where the manifest was read from, for error messages
    pub path: PathBuf,
    /// `(type name, members)` pairs in file order
    pub types: Vec<(String, Vec<String>)>,
    /// Value of the `<version>` element, if any
    pub version: Option<String>,
}

impl Manifest {
    /// Collapse the type blocks of this manifest into an index.
    pub fn to_index(&self) -> MemberIndex {
        let mut index = MemberIndex::new();
        for (type_name, members) in &self.types {
            if members.is_empty() {
                continue;
            }
            index
                .entry(type_name.clone())
                .or_default()
                .extend(members.iter().cloned());
        }
        index
    }
}

/// Parse manifest text. `path` is only used in error messages.
pub fn parse_manifest(text: &str, path: &Path) -> Result<Manifest> {
    let parse_error = |message: String| Error::ManifestParse {
        path: path.to_path_buf(),
        message,
    };

    let doc = XmlDocument::parse(text).map_err(|e| parse_error(e.to_string()))?;
    let root = doc
        .root_element()
        .map_err(|e| parse_error(e.to_string()))?;
    match doc.local_name(root) {
        Some("Package") => {}
        other => {
            return Err(parse_error(format!(
                "expected root element <Package>, found <{}>",
                other.unwrap_or_default()
            )))
        }
    }

    let mut types = Vec::new();
    for block in doc.child_elements(root, "types") {
        let name = doc
            .child_text(block, "name")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| parse_error("<types> block without <name>".to_string()))?;
        let members: Vec<String> = doc
            .child_texts(block, "members")
            .into_iter()
            .filter(|member| !member.is_empty())
            .collect();
        types.push((name, members));
    }

    Ok(Manifest {
        path: path.to_path_buf(),
        types,
        version: doc.child_text(root, "version"),
    })
}

/// Read and parse a manifest file.
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path).map_err(|e| Error::ManifestParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_manifest(&text, path)
}

/// Read a single manifest straight into an index.
pub fn read_index(path: &Path) -> Result<MemberIndex> {
    Ok(read_manifest(path)?.to_index())
}

/// Options controlling duplicate handling during a merge.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    /// Fail the merge when an error-level duplicate is found
    pub fail_on_duplicate: bool,
    /// Types whose duplicates are only reported as warnings
    pub ignored_duplicate_types: BTreeSet<String>,
}

/// Severity of a duplicate member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Members declared for the same type in more than one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateItem {
    pub type_name: String,
    pub members: Vec<String>,
    /// Manifest in which the members were seen again
    pub path: PathBuf,
    pub severity: Severity,
}

impl DuplicateItem {
    fn describe(&self) -> String {
        format!("{}: {}", self.type_name, self.members.join(", "))
    }
}

/// Outcome of merging manifests.
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    /// Union of all manifests
    pub index: MemberIndex,
    /// Every duplicate found, in discovery order
    pub duplicates: Vec<DuplicateItem>,
    /// First `<version>` found across the inputs
    pub version: Option<String>,
    /// Type names in the order they were first declared
    pub type_order: Vec<String>,
}

impl MergeReport {
    /// Whether any error-level duplicate was recorded.
    pub fn has_errors(&self) -> bool {
        self.duplicates
            .iter()
            .any(|item| item.severity == Severity::Error)
    }
}

/// Merge already parsed manifests.
pub fn merge_parsed<I>(manifests: I, options: &MergeOptions) -> Result<MergeReport>
where
    I: IntoIterator<Item = Manifest>,
{
    let mut report = MergeReport::default();

    for manifest in manifests {
        if report.version.is_none() {
            report.version = manifest.version.clone();
        }
        for (type_name, members) in manifest.types {
            if members.is_empty() {
                continue;
            }
            match report.index.get_mut(&type_name) {
                Some(existing) => {
                    let common: Vec<String> = members
                        .iter()
                        .filter(|member| member.as_str() != WILDCARD && existing.contains(*member))
                        .cloned()
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .collect();
                    if !common.is_empty() {
                        let severity = if options.ignored_duplicate_types.contains(&type_name) {
                            Severity::Warning
                        } else {
                            Severity::Error
                        };
                        let item = DuplicateItem {
                            type_name: type_name.clone(),
                            members: common,
                            path: manifest.path.clone(),
                            severity,
                        };
                        warn!(
                            "Duplicate members in {}: {}",
                            item.path.display(),
                            item.describe()
                        );
                        report.duplicates.push(item);
                    }
                    existing.extend(members);
                }
                None => {
                    debug!("{}: {} member(s)", type_name, members.len());
                    report.type_order.push(type_name.clone());
                    report
                        .index
                        .insert(type_name, members.into_iter().collect());
                }
            }
        }
    }

    if options.fail_on_duplicate && report.has_errors() {
        let items = report
            .duplicates
            .iter()
            .filter(|item| item.severity == Severity::Error)
            .map(DuplicateItem::describe)
            .collect();
        return Err(Error::ManifestConflict { items });
    }

    Ok(report)
}

/// Read and merge manifest files in order.
pub fn merge_manifests(paths: &[PathBuf], options: &MergeOptions) -> Result<MergeReport> {
    let manifests = paths
        .iter()
        .map(|path| read_manifest(path))
        .collect::<Result<Vec<_>>>()?;
    merge_parsed(manifests, options)
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render an index as a `package.xml` document.
///
/// Types without members are left out. `version` defaults to
/// [`DEFAULT_API_VERSION`].
pub fn write_manifest(index: &MemberIndex, version: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!("<Package xmlns=\"{}\">\n", METADATA_NAMESPACE));
    for (type_name, members) in index {
        if members.is_empty() {
            continue;
        }
        out.push_str("    <types>\n");
        for member in members {
            out.push_str(&format!("        <members>{}</members>\n", escape_text(member)));
        }
        out.push_str(&format!("        <name>{}</name>\n", escape_text(type_name)));
        out.push_str("    </types>\n");
    }
    out.push_str(&format!(
        "    <version>{}</version>\n",
        escape_text(version.unwrap_or(DEFAULT_API_VERSION))
    ));
    out.push_str("</Package>\n");
    out
}

/// Rewrite a manifest with types and members sorted and deduplicated.
///
/// The manifest's own `<version>` wins over `default_version`. The result is
/// written to `output`, or back to `path` when `output` is `None`.
pub fn sort_manifest_file(
    path: &Path,
    output: Option<&Path>,
    default_version: Option<&str>,
) -> Result<MemberIndex> {
    let manifest = read_manifest(path)?;
    let index = manifest.to_index();
    let version = manifest.version.as_deref().or(default_version);
    let target = output.unwrap_or(path);
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(target, write_manifest(&index, version))?;
    Ok(index)
}
