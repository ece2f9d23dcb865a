//! Default values for sfdx-meta.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Settings file looked up in the current directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".sfdx-meta.yaml";

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "SFDX_META_CONFIG";

/// API version written to manifests that do not carry one.
pub const DEFAULT_API_VERSION: &str = "59.0";

/// XML namespace of Metadata API documents.
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// Entries the project scanner skips unless configured otherwise.
pub const DEFAULT_SCAN_IGNORE: &[&str] = &[
    "jsconfig.json",
    ".eslintrc.json",
    "__tests__",
    "*.md",
];

/// Folder names that never denote a member.
pub const RESERVED_MEMBER_NAMES: &[&str] = &["unfiled$public"];

/// Returns the user-level settings file.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/sfdx-meta/config.yaml`
/// - macOS: `~/Library/Application Support/sfdx-meta/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\sfdx-meta\config.yaml`
///
/// Returns `None` if the platform configuration directory cannot be
/// determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sfdx-meta").join("config.yaml"))
}

/// Number of worker threads used when none is configured.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
