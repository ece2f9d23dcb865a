//! # Settings File
//!
//! Optional YAML settings shared by all commands. Command-line flags always
//! win over values read here.
//!
//! ```yaml
//! api_version: "59.0"
//! merge:
//!   fail_on_duplicate: true
//!   ignored_duplicate_types: [Profile, PermissionSet]
//! scan:
//!   ignore: ["jsconfig.json", "*.md"]
//! filter:
//!   jobs: 4
//! compare:
//!   fail_on_error: true
//! ```
//!
//! ## Lookup order
//!
//! 1. The path given with `--config` or the `SFDX_META_CONFIG` environment
//!    variable. A missing explicit file is an error.
//! 2. `.sfdx-meta.yaml` in the working directory.
//! 3. `config.yaml` in the user configuration directory.
//! 4. Built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{self, DEFAULT_CONFIG_FILENAME, DEFAULT_SCAN_IGNORE};
use crate::error::{Error, Result};
use crate::manifest::MergeOptions;
use crate::scanner::ScanOptions;

/// Merge settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeSettings {
    /// Fail when the same member appears in several manifests.
    pub fail_on_duplicate: bool,
    /// Types whose duplicates only produce warnings.
    pub ignored_duplicate_types: Vec<String>,
}

/// Scan settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSettings {
    /// Glob patterns matched against entry names to skip.
    pub ignore: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_SCAN_IGNORE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Filter settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    /// Worker threads for object and translation pruning.
    pub jobs: Option<usize>,
}

/// Compare settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareSettings {
    /// Exit with an error when a manifest member is missing from the project.
    pub fail_on_error: bool,
}

/// Contents of a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// API version written to generated manifests.
    pub api_version: Option<String>,
    pub merge: MergeSettings,
    pub scan: ScanSettings,
    pub filter: FilterSettings,
    pub compare: CompareSettings,
}

impl Settings {
    /// Merge options derived from these settings.
    pub fn merge_options(&self) -> MergeOptions {
        MergeOptions {
            fail_on_duplicate: self.merge.fail_on_duplicate,
            ignored_duplicate_types: self.merge.ignored_duplicate_types.iter().cloned().collect(),
        }
    }

    /// Scan options derived from these settings.
    pub fn scan_options(&self) -> Result<ScanOptions> {
        ScanOptions::from_patterns(&self.scan.ignore)
    }

    /// Worker threads for filtering, falling back to available parallelism.
    pub fn jobs(&self) -> usize {
        self.filter
            .jobs
            .filter(|jobs| *jobs > 0)
            .unwrap_or_else(defaults::default_jobs)
    }
}

/// Parse settings from YAML text. An empty document yields the defaults.
pub fn parse(yaml_content: &str) -> Result<Settings> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "Known keys: api_version, merge, scan, filter, compare".to_string(),
        ),
    })
}

/// Read settings from a file.
pub fn from_file(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("Failed to read {}: {}", path.display(), e),
        hint: None,
    })?;
    parse(&content)
}

/// Resolve the settings file to use, following the lookup order.
pub fn locate(explicit: Option<&Path>, working_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = working_dir.join(DEFAULT_CONFIG_FILENAME);
    if local.is_file() {
        return Some(local);
    }
    defaults::user_config_path().filter(|path| path.is_file())
}

/// Load settings, falling back to defaults when no file is found.
pub fn load(explicit: Option<&Path>, working_dir: &Path) -> Result<Settings> {
    match locate(explicit, working_dir) {
        Some(path) => {
            debug!("Loading settings from {}", path.display());
            from_file(&path)
        }
        None => Ok(Settings::default()),
    }
}
