//! # Error Handling
//!
//! This module defines the centralized error type for `sfdx-meta`. It uses the
//! `thiserror` library to create an `Error` enum covering every failure mode of
//! the library, with messages that name the offending file or metadata type.
//!
//! ## Fatal and non-fatal errors
//!
//! - **Fatal**: `ManifestParse` aborts a run. `ManifestConflict` and
//!   `ReconciliationMismatch` are only returned when the caller asked for
//!   strict behaviour.
//! - **Non-fatal**: `MissingInputPath` and `FragmentFilterSkipped` are
//!   normally recorded as values in a [`crate::filter::FilterSummary`] and
//!   processing continues with the next item.
//!
//! The `Result` alias is used by every library function.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for sfdx-meta operations
#[derive(Error, Debug)]
pub enum Error {
    /// A manifest could not be parsed or lacks the `Package/types` shape.
    #[error("Manifest parsing error in {}: {message}", path.display())]
    ManifestParse { path: PathBuf, message: String },

    /// The same member is declared for the same type in several manifests.
    ///
    /// Each item is rendered as `Type: member1, member2`.
    #[error("Manifest conflict: duplicate members across manifests: {}", items.join("; "))]
    ManifestConflict { items: Vec<String> },

    /// A file or folder referenced by a manifest or a command is absent.
    #[error("Input path not found: {}", path.display())]
    MissingInputPath { path: PathBuf },

    /// The output directory of a filtering run would contain its input.
    #[error("Output directory {} contains the input directory {}", output.display(), input.display())]
    OutputContainsInput { input: PathBuf, output: PathBuf },

    /// A composite metadata file was skipped because it could not be filtered.
    #[error("Fragment filtering skipped for {}: {message}", path.display())]
    FragmentFilterSkipped { path: PathBuf, message: String },

    /// Manifest and project disagree and the caller asked to fail on it.
    #[error("Manifest and project are inconsistent for: {}", types.join(", "))]
    ReconciliationMismatch { types: Vec<String> },

    /// The settings file could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An XML document could not be parsed or serialized.
    #[error("XML error: {message}")]
    Xml { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory walk failed, wrapped from `walkdir::Error`.
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
