//! # Project Scanner
//!
//! Walks an SFDX source-format project directory (typically
//! `force-app/main/default`) and rebuilds the [`MemberIndex`] a manifest
//! would need to describe it, so both can be compared string for string.
//!
//! ## Naming rules
//!
//! - Each immediate sub-folder is matched against the registry by folder
//!   name. Unknown folders are skipped.
//! - A member name is the entry name with its longest known suffix removed.
//!   Candidate suffixes are the type's own suffixes, their `-meta.xml`
//!   source-format variants and the bare `-meta.xml`.
//! - Names still ending in `-meta`, hidden entries, reserved folder names and
//!   entries matching the ignore globs are not members.
//! - `objects/<Name>/` registers `CustomObject` for custom object names and
//!   `<Name>.<fragment>` members for every fragment sub-folder.
//! - `labels/*.labels-meta.xml` is parsed and every label becomes a
//!   `CustomLabel` member.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use glob::Pattern;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::defaults::{DEFAULT_SCAN_IGNORE, RESERVED_MEMBER_NAMES};
use crate::error::{Error, Result};
use crate::manifest::MemberIndex;
use crate::registry::{
    self, MetadataTypeDescriptor, CUSTOM_LABEL_TYPE, CUSTOM_OBJECT_TYPE, LABELS_FOLDER,
    META_XML_SUFFIX, OBJECTS_FOLDER,
};
use crate::xml::XmlDocument;

/// Options controlling which entries the scanner skips.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    ignore: Vec<Pattern>,
}

impl ScanOptions {
    /// Build options from glob patterns matched against entry names.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let ignore = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern.as_ref()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { ignore })
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|pattern| pattern.matches(name))
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_SCAN_IGNORE
                .iter()
                .filter_map(|pattern| Pattern::new(pattern).ok())
                .collect(),
        }
    }
}

/// Immediate children of `dir`, sorted by name, as `(name, is_dir)`.
fn list_entries(dir: &Path) -> Result<Vec<(String, bool)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let Some(name) = entry.file_name().to_str() else {
            warn!("Skipping non UTF-8 entry {}", entry.path().display());
            continue;
        };
        entries.push((name.to_string(), entry.file_type().is_dir()));
    }
    Ok(entries)
}

/// Suffixes to try for a type, longest first.
fn candidate_suffixes(desc: &MetadataTypeDescriptor) -> Vec<String> {
    let mut suffixes: BTreeSet<String> = BTreeSet::new();
    for suffix in desc.suffixes() {
        if suffix.is_empty() {
            continue;
        }
        suffixes.insert(suffix.to_string());
        if !registry::is_meta_sidecar(suffix) {
            suffixes.insert(format!("{}{}", suffix, META_XML_SUFFIX));
        }
    }
    suffixes.insert(META_XML_SUFFIX.to_string());
    let mut ordered: Vec<String> = suffixes.into_iter().collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    ordered
}

/// Strip the first (longest) matching suffix. A suffix equal to the whole
/// name is not stripped.
fn strip_known_suffix<'a>(name: &'a str, suffixes: &[String]) -> &'a str {
    suffixes
        .iter()
        .find_map(|suffix| {
            name.strip_suffix(suffix.as_str())
                .filter(|stem| !stem.is_empty())
        })
        .unwrap_or(name)
}

/// Member name for an entry, or `None` when the entry is not a member.
fn member_name(name: &str, suffixes: &[String], options: &ScanOptions) -> Option<String> {
    if name.starts_with('.') || options.is_ignored(name) {
        return None;
    }
    let stem = strip_known_suffix(name, suffixes);
    if stem.ends_with("-meta") || RESERVED_MEMBER_NAMES.contains(&stem) {
        return None;
    }
    Some(stem.to_string())
}

/// Folder meta files of foldered types, e.g. `Sales.reportFolder-meta.xml`.
fn folder_meta_name(name: &str) -> Option<&str> {
    if name.ends_with(&format!("Folder{}", META_XML_SUFFIX)) {
        name.split('.').next()
    } else {
        None
    }
}

/// Whether `entry` is the content file (or folder) of the member `stem`.
fn owned_by(stem: &str, entry: &str) -> bool {
    entry == stem
        || entry
            .strip_prefix(stem)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Member names found in one directory listing, as `(member, is_dir)`.
fn listing_members(
    dir: &Path,
    desc: &MetadataTypeDescriptor,
    suffixes: &[String],
    options: &ScanOptions,
) -> Result<Vec<(String, bool)>> {
    let entries = list_entries(dir)?;
    let sidecar = registry::find_content_sidecar(desc.name);
    let sidecar_stem = |name: &str| -> Option<String> {
        sidecar
            .and_then(|sidecar| name.strip_suffix(sidecar.suffix))
            .filter(|stem| !stem.is_empty())
            .map(str::to_string)
    };
    let stems: BTreeSet<String> = entries
        .iter()
        .filter_map(|(name, _)| sidecar_stem(name))
        .collect();

    let mut members = Vec::new();
    for (name, is_dir) in &entries {
        if name.starts_with('.') || options.is_ignored(name) {
            continue;
        }
        if desc.is_foldered() {
            if let Some(folder) = folder_meta_name(name) {
                members.push((folder.to_string(), false));
                continue;
            }
        }
        if let Some(sidecar) = sidecar {
            if let Some(stem) = sidecar_stem(name) {
                let has_content = entries.iter().any(|(other, _)| {
                    other != name && sidecar_stem(other).is_none() && owned_by(&stem, other)
                });
                if !(sidecar.member_keeps_extension && has_content) {
                    members.push((stem, false));
                }
                continue;
            }
            if stems.iter().any(|stem| owned_by(stem, name)) {
                if sidecar.member_keeps_extension {
                    members.push((name.clone(), *is_dir));
                }
                continue;
            }
        }
        if let Some(member) = member_name(name, suffixes, options) {
            members.push((member, *is_dir));
        }
    }
    Ok(members)
}

fn scan_type_folder(
    dir: &Path,
    desc: &MetadataTypeDescriptor,
    options: &ScanOptions,
) -> Result<BTreeSet<String>> {
    let suffixes = candidate_suffixes(desc);
    let mut members = BTreeSet::new();

    for (member, is_dir) in listing_members(dir, desc, &suffixes, options)? {
        if desc.is_foldered() && is_dir {
            for (item, _) in listing_members(&dir.join(&member), desc, &suffixes, options)? {
                members.insert(format!("{}/{}", member, item));
            }
        }
        members.insert(member);
    }

    Ok(members)
}

fn scan_objects(dir: &Path, options: &ScanOptions, index: &mut MemberIndex) -> Result<()> {
    for (object, is_dir) in list_entries(dir)? {
        if !is_dir {
            debug!("Skipping file {} in {}", object, OBJECTS_FOLDER);
            continue;
        }
        if registry::is_custom_object_name(&object) {
            index
                .entry(CUSTOM_OBJECT_TYPE.to_string())
                .or_default()
                .insert(object.clone());
        }

        let object_dir = dir.join(&object);
        for (sub, sub_is_dir) in list_entries(&object_dir)? {
            if !sub_is_dir {
                continue;
            }
            let Some(fragment) = registry::find_fragment_by_folder(&sub) else {
                debug!("Unknown object sub-folder {}/{}", object, sub);
                continue;
            };
            let suffixes = vec![
                fragment.source_suffix.to_string(),
                META_XML_SUFFIX.to_string(),
            ];
            for (file, _) in list_entries(&object_dir.join(&sub))? {
                if let Some(local) = member_name(&file, &suffixes, options) {
                    index
                        .entry(fragment.type_name.to_string())
                        .or_default()
                        .insert(format!("{}.{}", object, local));
                }
            }
        }
    }
    Ok(())
}

fn scan_labels(dir: &Path, index: &mut MemberIndex) -> Result<()> {
    for (name, is_dir) in list_entries(dir)? {
        if is_dir || !(name.ends_with(".labels") || name.ends_with(".labels-meta.xml")) {
            continue;
        }
        let path = dir.join(&name);
        let text = fs::read_to_string(&path)?;
        let doc = match XmlDocument::parse(&text) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("Skipping unreadable labels file {}: {}", path.display(), e);
                continue;
            }
        };
        let root = doc.root_element()?;
        let labels = index.entry(CUSTOM_LABEL_TYPE.to_string()).or_default();
        for label in doc.child_elements(root, "labels") {
            if let Some(full_name) = doc.child_text(label, "fullName") {
                labels.insert(full_name);
            }
        }
    }
    Ok(())
}

/// Scan a source-format project directory.
pub fn scan_project(root: &Path, options: &ScanOptions) -> Result<MemberIndex> {
    if !root.is_dir() {
        return Err(Error::MissingInputPath {
            path: root.to_path_buf(),
        });
    }

    let mut index = MemberIndex::new();
    for (folder, is_dir) in list_entries(root)? {
        if !is_dir {
            continue;
        }
        let dir = root.join(&folder);
        if folder == OBJECTS_FOLDER {
            scan_objects(&dir, options, &mut index)?;
            continue;
        }
        if folder == LABELS_FOLDER {
            scan_labels(&dir, &mut index)?;
            continue;
        }
        let Some(desc) = registry::find_type_by_folder(&folder) else {
            debug!("No metadata type for folder {}", folder);
            continue;
        };
        let members = scan_type_folder(&dir, desc, options)?;
        debug!("{}: {} member(s) in {}", desc.name, members.len(), folder);
        if !members.is_empty() {
            index
                .entry(desc.name.to_string())
                .or_default()
                .extend(members);
        }
    }

    index.retain(|_, members| !members.is_empty());
    Ok(index)
}
