//! # Filter/Copy Engine
//!
//! Builds an output tree holding only what one or more manifests ask for.
//!
//! ## Passes
//!
//! 1. The manifests are merged and the output directory is recreated. The
//!    manifest files are copied verbatim into the output root.
//! 2. Every type of the merged index is resolved through the registry:
//!    directory types copy member files, fragment types are collected into a
//!    per-object map, translation types also contribute language codes.
//! 3. The aggregate labels file is pruned to the listed labels.
//! 4. Collected objects are read from `objects/` and their fragments pruned.
//! 5. `objectTranslations/<Object>-<lang>.objectTranslation` files of
//!    collected objects and requested languages are pruned the same way.
//!
//! Passes 4 and 5 touch independent files and run on a bounded worker pool.
//! A composite file that cannot be parsed is reported in the
//! [`FilterSummary`] and the run continues.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fsutil;
use crate::manifest::{self, MemberIndex, MergeOptions};
use crate::registry::{
    self, MetadataTypeDescriptor, Storage, CUSTOM_LABEL_TYPE, OBJECTS_FOLDER,
    OBJECT_SUFFIX, OBJECT_TRANSLATIONS_FOLDER, OBJECT_TRANSLATION_SUFFIX, WILDCARD,
};
use crate::xml::XmlDocument;

/// Requested fragment names, keyed by object name then fragment type name.
pub type FragmentMap = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Inputs of a filtering run.
#[derive(Debug, Clone)]
pub struct FilterRequest {
    /// Manifests merged into the filter
    pub manifest_paths: Vec<PathBuf>,
    /// Project tree to read from
    pub input: PathBuf,
    /// Directory to (re)create
    pub output: PathBuf,
    /// Worker threads for object and translation pruning
    pub jobs: usize,
}

/// What a filtering run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    /// Counted copies per type. Side-car files are not counted.
    pub copied: BTreeMap<String, usize>,
    /// Objects written to `objects/`
    pub objects: Vec<String>,
    /// `<Object>-<lang>` pairs written to `objectTranslations/`
    pub translations: Vec<String>,
    /// Non-fatal problems: missing inputs and skipped composite files
    pub skipped: Vec<String>,
}

impl FilterSummary {
    /// Counted copies for one type.
    pub fn copied_count(&self, type_name: &str) -> usize {
        self.copied.get(type_name).copied().unwrap_or(0)
    }

    /// Counted copies across all types.
    pub fn total_copied(&self) -> usize {
        self.copied.values().sum()
    }

    fn record_skip(&mut self, err: Error) {
        warn!("{}", err);
        self.skipped.push(err.to_string());
    }
}

/// State collected from the manifest before composite files are pruned.
#[derive(Debug, Default)]
struct Plan {
    objects: BTreeSet<String>,
    all_objects: bool,
    fragments: FragmentMap,
    /// Fragment types requested with `*`
    wildcard_fragments: BTreeSet<String>,
    languages: BTreeSet<String>,
    all_languages: bool,
    labels: Option<LabelRequest>,
}

#[derive(Debug)]
struct LabelRequest {
    path: PathBuf,
    members: BTreeSet<String>,
}

impl Plan {
    fn collect_fragments(&mut self, type_name: &str, members: &BTreeSet<String>, add_objects: bool) {
        let Some(fragment) = registry::find_fragment_by_type(type_name) else {
            return;
        };
        for member in members {
            if member == WILDCARD {
                self.wildcard_fragments.insert(type_name.to_string());
                continue;
            }
            match fragment.split_member(member) {
                Some((object, name)) => {
                    if add_objects {
                        self.objects.insert(object.to_string());
                    }
                    self.fragments
                        .entry(object.to_string())
                        .or_default()
                        .entry(type_name.to_string())
                        .or_default()
                        .insert(name.to_string());
                }
                None if add_objects => {
                    self.objects.insert(member.clone());
                }
                None => {}
            }
        }
    }

    /// Fragment names requested for `object`, restricted to kinds present in
    /// `.object` files when `translation` is false.
    fn wanted(&self, object: &str, translation: bool) -> Option<&BTreeMap<String, BTreeSet<String>>> {
        let wanted = self.fragments.get(object)?;
        let relevant = wanted.keys().any(|type_name| {
            registry::find_fragment_by_type(type_name)
                .is_some_and(|fragment| translation || fragment.in_object_file)
        });
        relevant.then_some(wanted)
    }
}

fn is_wildcard(members: &BTreeSet<String>) -> bool {
    members.contains(WILDCARD)
}

/// Filter `request.input` into `request.output` according to the manifests.
///
/// A manifest that cannot be read or parsed aborts the run before the output
/// directory is touched.
pub fn filter_project(request: &FilterRequest) -> Result<FilterSummary> {
    let report = manifest::merge_manifests(&request.manifest_paths, &MergeOptions::default())?;

    if !request.input.is_dir() {
        return Err(Error::MissingInputPath {
            path: request.input.clone(),
        });
    }
    check_disjoint(&request.input, &request.output)?;

    // Manifests may live inside the output directory
    let manifests = read_manifest_files(&request.manifest_paths)?;
    fsutil::reset_dir(&request.output)?;
    write_manifest_files(&manifests, &request.output)?;

    // Types are handled in the order the manifests declare them
    let types = report
        .type_order
        .iter()
        .filter_map(|type_name| report.index.get_key_value(type_name));
    filter_types(types, &request.input, &request.output, request.jobs)
}

/// Filter an already merged index, type by type in name order. The output
/// directory must exist.
pub fn filter_index(
    index: &MemberIndex,
    input: &Path,
    output: &Path,
    jobs: usize,
) -> Result<FilterSummary> {
    filter_types(index.iter(), input, output, jobs)
}

fn filter_types<'a, I>(types: I, input: &Path, output: &Path, jobs: usize) -> Result<FilterSummary>
where
    I: IntoIterator<Item = (&'a String, &'a BTreeSet<String>)>,
{
    let mut summary = FilterSummary::default();
    let mut plan = Plan::default();

    for (type_name, members) in types {
        let Some(desc) = registry::find_type(type_name) else {
            debug!("Skipping unsupported type {}", type_name);
            continue;
        };
        match desc.storage {
            Storage::Directory { folder, suffixes } => {
                copy_members(desc, folder, suffixes, members, input, output, &mut summary)?;
                // Layout members also restrict the layout entries of translations
                plan.collect_fragments(type_name, members, false);
            }
            Storage::Translation { folder, suffixes } => {
                copy_members(desc, folder, suffixes, members, input, output, &mut summary)?;
                if is_wildcard(members) {
                    plan.all_languages = true;
                }
                plan.languages
                    .extend(members.iter().filter(|m| m.as_str() != WILDCARD).cloned());
            }
            Storage::ObjectFile => {
                if is_wildcard(members) {
                    plan.all_objects = true;
                }
                plan.objects
                    .extend(members.iter().filter(|m| m.as_str() != WILDCARD).cloned());
            }
            Storage::ObjectFragment => plan.collect_fragments(type_name, members, true),
            Storage::LabelFile { folder, file } => {
                plan.labels = Some(LabelRequest {
                    path: Path::new(folder).join(file),
                    members: members.clone(),
                });
            }
        }
    }

    if let Some(labels) = &plan.labels {
        filter_labels(labels, input, output, &mut summary)?;
    }

    if plan.all_objects {
        plan.objects.extend(list_objects(input)?);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?;

    let objects: Vec<String> = plan.objects.iter().cloned().collect();
    let outcomes: Vec<(String, Result<bool>)> = pool.install(|| {
        objects
            .par_iter()
            .map(|object| (object.clone(), filter_object(&plan, object, input, output)))
            .collect()
    });
    for (object, outcome) in outcomes {
        match outcome {
            Ok(true) => summary.objects.push(object),
            Ok(false) => {}
            Err(err) => summary.record_skip(err),
        }
    }

    if plan.all_languages || !plan.languages.is_empty() {
        let pairs = list_translations(&plan, input)?;
        let outcomes: Vec<(String, Result<()>)> = pool.install(|| {
            pairs
                .par_iter()
                .map(|(object, language)| {
                    (
                        format!("{}-{}", object, language),
                        filter_translation(&plan, object, language, input, output),
                    )
                })
                .collect()
        });
        for (pair, outcome) in outcomes {
            match outcome {
                Ok(()) => summary.translations.push(pair),
                Err(err) => summary.record_skip(err),
            }
        }
    }

    info!(
        "Copied {} member(s), {} object(s), {} translation(s)",
        summary.total_copied(),
        summary.objects.len(),
        summary.translations.len()
    );
    Ok(summary)
}

/// Refuse runs whose output directory would swallow the input.
fn check_disjoint(input: &Path, output: &Path) -> Result<()> {
    let (Ok(input), Ok(output)) = (input.canonicalize(), output.canonicalize()) else {
        return Ok(());
    };
    if input.starts_with(&output) {
        return Err(Error::OutputContainsInput { input, output });
    }
    Ok(())
}

/// Manifest contents keyed by the file name they are written back under.
fn read_manifest_files(paths: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut used = BTreeSet::new();
    let mut manifests = Vec::with_capacity(paths.len());
    for (idx, path) in paths.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package.xml".to_string());
        let target_name = if used.contains(&file_name) {
            format!("{}-{}", idx, file_name)
        } else {
            file_name
        };
        used.insert(target_name.clone());
        manifests.push((target_name, fs::read(path)?));
    }
    Ok(manifests)
}

fn write_manifest_files(manifests: &[(String, Vec<u8>)], output: &Path) -> Result<()> {
    for (name, content) in manifests {
        fsutil::write_file(&output.join(name), content)?;
    }
    Ok(())
}

fn copy_members(
    desc: &MetadataTypeDescriptor,
    folder: &str,
    suffixes: &[&str],
    members: &BTreeSet<String>,
    input: &Path,
    output: &Path,
    summary: &mut FilterSummary,
) -> Result<()> {
    let src_dir = input.join(folder);
    if !src_dir.is_dir() {
        debug!("{}: no {} folder in input", desc.name, folder);
        return Ok(());
    }
    let dst_dir = output.join(folder);

    if is_wildcard(members) {
        fsutil::copy_dir_all(&src_dir, &dst_dir)?;
        let count = count_top_level_members(&src_dir)?;
        *summary.copied.entry(desc.name.to_string()).or_default() += count;
        return Ok(());
    }

    fsutil::ensure_dir(&dst_dir)?;
    for member in members {
        let mut found = false;
        for suffix in suffixes {
            let relative = format!("{}{}", member, suffix);
            let src = src_dir.join(&relative);
            if !src.exists() {
                continue;
            }
            let dst = dst_dir.join(&relative);
            if src.is_dir() {
                if desc.is_foldered() {
                    // Folder members carry no content of their own
                    fsutil::ensure_dir(&dst)?;
                } else {
                    fsutil::copy_dir_all(&src, &dst)?;
                }
            } else {
                fsutil::copy_file(&src, &dst)?;
            }
            found = true;
            if !registry::is_meta_sidecar(suffix) {
                *summary.copied.entry(desc.name.to_string()).or_default() += 1;
            }
        }
        if !found {
            summary.record_skip(Error::MissingInputPath {
                path: src_dir.join(member),
            });
        }
    }
    Ok(())
}

fn count_top_level_members(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        if !name.to_string_lossy().ends_with(registry::META_XML_SUFFIX) {
            count += 1;
        }
    }
    Ok(count)
}

fn list_objects(input: &Path) -> Result<Vec<String>> {
    let dir = input.join(OBJECTS_FOLDER);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut objects = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if let Some(object) = name.strip_suffix(OBJECT_SUFFIX) {
            objects.push(object.to_string());
        }
    }
    Ok(objects)
}

/// `(object, language)` pairs with an existing translation file.
fn list_translations(plan: &Plan, input: &Path) -> Result<Vec<(String, String)>> {
    let dir = input.join(OBJECT_TRANSLATIONS_FOLDER);
    if !dir.is_dir() {
        debug!("No {} folder in input", OBJECT_TRANSLATIONS_FOLDER);
        return Ok(Vec::new());
    }
    let mut pairs = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        let Some(stem) = name.strip_suffix(OBJECT_TRANSLATION_SUFFIX) else {
            continue;
        };
        let Some((object, language)) = stem.rsplit_once('-') else {
            continue;
        };
        if plan.objects.contains(object)
            && (plan.all_languages || plan.languages.contains(language))
        {
            pairs.push((object.to_string(), language.to_string()));
        }
    }
    pairs.sort();
    Ok(pairs)
}

fn filter_labels(
    request: &LabelRequest,
    input: &Path,
    output: &Path,
    summary: &mut FilterSummary,
) -> Result<()> {
    let src = input.join(&request.path);
    if !src.is_file() {
        summary.record_skip(Error::MissingInputPath { path: src });
        return Ok(());
    }
    let dst = output.join(&request.path);

    if is_wildcard(&request.members) {
        fsutil::copy_file(&src, &dst)?;
        return Ok(());
    }

    match prune_labels(&src, &request.members) {
        Ok((content, kept)) => {
            fsutil::write_file(&dst, content.as_bytes())?;
            *summary.copied.entry(CUSTOM_LABEL_TYPE.to_string()).or_default() += kept;
        }
        Err(err) => summary.record_skip(err),
    }
    Ok(())
}

fn prune_labels(src: &Path, members: &BTreeSet<String>) -> Result<(String, usize)> {
    let skipped = |message: String| Error::FragmentFilterSkipped {
        path: src.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(src).map_err(|e| skipped(e.to_string()))?;
    let mut doc = XmlDocument::parse(&text).map_err(|e| skipped(e.to_string()))?;
    let root = doc.root_element().map_err(|e| skipped(e.to_string()))?;
    if doc.local_name(root) != Some("CustomLabels") {
        return Err(skipped("root element is not CustomLabels".to_string()));
    }

    let labels = doc.child_elements(root, "labels");
    let doomed: Vec<_> = labels
        .iter()
        .copied()
        .filter(|label| {
            doc.child_text(*label, "fullName")
                .map_or(true, |name| !members.contains(&name))
        })
        .collect();
    let kept = labels.len() - doomed.len();
    doc.remove_children(root, &doomed)
        .map_err(|e| skipped(e.to_string()))?;
    let content = doc.to_xml_string().map_err(|e| skipped(e.to_string()))?;
    Ok((content, kept))
}

/// Prune the fragments of a composite object document.
///
/// For every fragment kind handled by the document, entries whose name is
/// not listed in `wanted` are removed. Kinds requested with `*` are kept
/// whole. Elements that are not fragments are never touched.
pub fn prune_fragments(
    doc: &mut XmlDocument,
    wanted: &BTreeMap<String, BTreeSet<String>>,
    wildcard: &BTreeSet<String>,
    translation: bool,
) -> Result<()> {
    let root = doc.root_element()?;
    let empty = BTreeSet::new();
    for fragment in registry::describe_object_fragment_types() {
        if !translation && !fragment.in_object_file {
            continue;
        }
        if wildcard.contains(fragment.type_name) {
            continue;
        }
        let entries = doc.child_elements(root, fragment.element);
        if entries.is_empty() {
            continue;
        }
        let name_field = if translation {
            fragment.translation_name_field
        } else {
            fragment.name_field
        };
        let keep = wanted.get(fragment.type_name).unwrap_or(&empty);
        let doomed: Vec<_> = entries
            .into_iter()
            .filter(|entry| {
                doc.child_text(*entry, name_field)
                    .map_or(true, |name| !keep.contains(&name))
            })
            .collect();
        doc.remove_children(root, &doomed)?;
    }
    Ok(())
}

fn prune_composite(
    src: &Path,
    dst: &Path,
    expected_root: &str,
    wanted: &BTreeMap<String, BTreeSet<String>>,
    wildcard: &BTreeSet<String>,
    translation: bool,
) -> Result<()> {
    let skipped = |message: String| Error::FragmentFilterSkipped {
        path: src.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(src).map_err(|e| skipped(e.to_string()))?;
    let mut doc = XmlDocument::parse(&text).map_err(|e| skipped(e.to_string()))?;
    let root = doc.root_element().map_err(|e| skipped(e.to_string()))?;
    if doc.local_name(root) != Some(expected_root) {
        return Err(skipped(format!("root element is not {}", expected_root)));
    }
    prune_fragments(&mut doc, wanted, wildcard, translation).map_err(|e| skipped(e.to_string()))?;
    let content = doc.to_xml_string().map_err(|e| skipped(e.to_string()))?;
    fsutil::write_file(dst, content.as_bytes())
}

/// Returns `Ok(false)` when the object has no file in the input tree.
fn filter_object(plan: &Plan, object: &str, input: &Path, output: &Path) -> Result<bool> {
    let relative = Path::new(OBJECTS_FOLDER).join(format!("{}{}", object, OBJECT_SUFFIX));
    let src = input.join(&relative);
    if !src.is_file() {
        debug!("Object {} not found in input, skipping", object);
        return Ok(false);
    }
    let dst = output.join(&relative);
    match plan.wanted(object, false) {
        None => fsutil::copy_file(&src, &dst)?,
        Some(wanted) => prune_composite(
            &src,
            &dst,
            "CustomObject",
            wanted,
            &plan.wildcard_fragments,
            false,
        )?,
    }
    Ok(true)
}

fn filter_translation(
    plan: &Plan,
    object: &str,
    language: &str,
    input: &Path,
    output: &Path,
) -> Result<()> {
    let relative = Path::new(OBJECT_TRANSLATIONS_FOLDER).join(format!(
        "{}-{}{}",
        object, language, OBJECT_TRANSLATION_SUFFIX
    ));
    let src = input.join(&relative);
    let dst = output.join(&relative);
    match plan.wanted(object, true) {
        None => fsutil::copy_file(&src, &dst),
        Some(wanted) => prune_composite(
            &src,
            &dst,
            "CustomObjectTranslation",
            wanted,
            &plan.wildcard_fragments,
            true,
        ),
    }
}
