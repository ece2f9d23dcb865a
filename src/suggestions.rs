//! # Error Suggestions
//!
//! Error messages that say what went wrong and how to fix it. Commands use
//! these instead of bare `anyhow!` messages for the failures users hit most.
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! if !path.is_file() {
//!     return Err(suggestions::manifest_not_found(path));
//! }
//! ```

use std::path::Path;

use crate::registry;

/// A manifest path given on the command line does not exist.
pub fn manifest_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Manifest not found: {path}\n\n\
         hint: Pass the path of a package.xml file, e.g. manifest/package.xml\n\
         hint: Generate one from a project with 'sfdx-meta scan <dir> -o package.xml'",
        path = path.display()
    )
}

/// The project directory to read from does not exist.
pub fn project_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Project directory not found: {path}\n\n\
         hint: Point at the folder holding 'classes', 'objects', ... \
         (for example force-app/main/default or src)",
        path = path.display()
    )
}

/// An explicit settings file does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Settings file not found: {path}\n\n\
         hint: Create a .sfdx-meta.yaml file in the working directory\n\
         hint: Use --config to specify a different path\n\
         hint: Unset the SFDX_META_CONFIG environment variable to use defaults",
        path = path.display()
    )
}

/// Strict merge found duplicate members.
pub fn merge_conflict(error: impl std::fmt::Display) -> anyhow::Error {
    anyhow::anyhow!(
        "{error}\n\n\
         hint: Use --ignore-duplicates <TYPE> to downgrade duplicates of a type to warnings\n\
         hint: Drop --strict to only report duplicates"
    )
}

/// An ignore pattern from the settings file is not a valid glob.
pub fn invalid_glob(pattern: &str, error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid glob pattern: {pattern}\n\
         error: {error}\n\n\
         hint: Patterns match single entry names, e.g. '*.md' or '__tests__'\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// Message for a type name the registry does not know, with a close match
/// when there is one.
pub fn unknown_type(name: &str) -> String {
    let names: Vec<&str> = registry::describe_metadata_types()
        .iter()
        .map(|desc| desc.name)
        .collect();
    let did_you_mean = find_similar(name, &names)
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default();
    format!("Unknown metadata type: {name}{did_you_mean}")
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, case-sensitive.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}
