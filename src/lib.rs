//! # sfdx-meta Library
//!
//! Manifest-driven tooling for Salesforce projects in Metadata API or SFDX
//! source layout. The library backs the `sfdx-meta` command-line tool and
//! can be used on its own.
//!
//! ## Quick Example
//!
//! ```
//! use sfdx_meta::manifest::{merge_parsed, parse_manifest, MergeOptions};
//! use std::path::Path;
//!
//! let first = parse_manifest(
//!     r#"<Package><types><members>Foo</members><name>ApexClass</name></types></Package>"#,
//!     Path::new("a.xml"),
//! ).unwrap();
//! let second = parse_manifest(
//!     r#"<Package><types><members>Bar</members><name>ApexClass</name></types></Package>"#,
//!     Path::new("b.xml"),
//! ).unwrap();
//!
//! let report = merge_parsed(vec![first, second], &MergeOptions::default()).unwrap();
//! let members: Vec<_> = report.index["ApexClass"].iter().cloned().collect();
//! assert_eq!(members, vec!["Bar", "Foo"]);
//! assert!(report.duplicates.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! - **Registry (`registry`)**: closed table describing where each metadata
//!   type lives on disk and how member names map to files.
//! - **Manifests (`manifest`)**: `package.xml` reading, merging with duplicate
//!   detection, and canonical writing.
//! - **Scanner (`scanner`)**: derives a manifest index from a project tree.
//! - **Filter (`filter`)**: copies the subset of a project a manifest selects
//!   and prunes fragments of `.object`, `.objectTranslation` and labels files.
//! - **Reconciler (`reconcile`)**: compares a manifest with a scanned project.
//!
//! Settings (`config`), terminal output (`output`) and user-facing hints
//! (`suggestions`) serve the command-line tool.

pub mod config;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod fsutil;
pub mod manifest;
pub mod output;
pub mod reconcile;
pub mod registry;
pub mod scanner;
pub mod suggestions;
pub mod xml;

#[cfg(test)]
mod manifest_proptest;
