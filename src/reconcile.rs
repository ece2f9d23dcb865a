//! # Set Reconciler
//!
//! Compares what a manifest declares with what a project actually contains.
//!
//! One row is produced per type found in the project. Types that only appear
//! in the manifest are not reported: the scanner only knows registered
//! folders, so their absence says nothing about the project.
//!
//! | Situation                       | Status    |
//! |---------------------------------|-----------|
//! | manifest lists `*`              | `success` |
//! | member only in the project      | `warning` |
//! | member only in the manifest     | `error`   |

use std::collections::BTreeSet;
use std::fmt;

use console::style;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::manifest::MemberIndex;
use crate::output::OutputConfig;
use crate::registry::WILDCARD;

/// Outcome of one row, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Success => "success",
            Status::Warning => "warning",
            Status::Error => "error",
        };
        f.write_str(label)
    }
}

/// Comparison of one type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    #[serde(rename = "type")]
    pub type_name: String,
    pub status: Status,
    /// Members present on both sides, or every project member under `*`
    pub identical: usize,
    /// `None` when the manifest uses `*`
    pub in_project_only: Option<Vec<String>>,
    /// `None` when the manifest uses `*`
    pub in_manifest_only: Option<Vec<String>>,
}

/// All rows plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub rows: Vec<ReconciliationRow>,
    /// False as soon as one row reached [`Status::Error`]
    pub success: bool,
}

impl ReconciliationReport {
    /// Types whose row reached [`Status::Error`].
    pub fn failed_types(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.status == Status::Error)
            .map(|row| row.type_name.clone())
            .collect()
    }

    /// Turn error rows into [`Error::ReconciliationMismatch`].
    pub fn ensure_success(&self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(Error::ReconciliationMismatch {
                types: self.failed_types(),
            })
        }
    }
}

fn reconcile_type(
    type_name: &str,
    project: &BTreeSet<String>,
    manifest: Option<&BTreeSet<String>>,
) -> ReconciliationRow {
    let empty = BTreeSet::new();
    let manifest = manifest.unwrap_or(&empty);

    if manifest.contains(WILDCARD) {
        return ReconciliationRow {
            type_name: type_name.to_string(),
            status: Status::Success,
            identical: project.len(),
            in_project_only: None,
            in_manifest_only: None,
        };
    }

    let identical = project.intersection(manifest).count();
    let in_project_only: Vec<String> = project.difference(manifest).cloned().collect();
    let in_manifest_only: Vec<String> = manifest.difference(project).cloned().collect();

    let mut status = Status::Success;
    if !in_project_only.is_empty() {
        status = status.max(Status::Warning);
    }
    if !in_manifest_only.is_empty() {
        status = status.max(Status::Error);
    }

    ReconciliationRow {
        type_name: type_name.to_string(),
        status,
        identical,
        in_project_only: Some(in_project_only),
        in_manifest_only: Some(in_manifest_only),
    }
}

/// Compare a manifest index against a scanned project index.
pub fn reconcile(manifest: &MemberIndex, project: &MemberIndex) -> ReconciliationReport {
    let rows: Vec<ReconciliationRow> = project
        .iter()
        .map(|(type_name, members)| reconcile_type(type_name, members, manifest.get(type_name)))
        .collect();
    let success = rows.iter().all(|row| row.status != Status::Error);
    ReconciliationReport { rows, success }
}

fn count_cell(list: &Option<Vec<String>>) -> String {
    match list {
        Some(list) => list.len().to_string(),
        None => "n/a".to_string(),
    }
}

fn status_cell(status: Status, config: &OutputConfig) -> String {
    let text = format!("{:<8}", status);
    if !config.use_color {
        return text;
    }
    let styled = style(text).force_styling(true);
    match status {
        Status::Success => styled.green().to_string(),
        Status::Warning => styled.yellow().to_string(),
        Status::Error => styled.red().bold().to_string(),
    }
}

/// Render a report as a human-readable table followed by the mismatched
/// members.
pub fn render_table(report: &ReconciliationReport, config: &OutputConfig) -> String {
    let width = report
        .rows
        .iter()
        .map(|row| row.type_name.len())
        .max()
        .unwrap_or(0)
        .max("TYPE".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$} {:<8} {:>9} {:>12} {:>13}\n",
        "TYPE",
        "STATUS",
        "IDENTICAL",
        "PROJECT ONLY",
        "MANIFEST ONLY",
        width = width
    ));
    out.push_str(&format!("{}\n", "-".repeat(width + 46)));

    for row in &report.rows {
        out.push_str(&format!(
            "{:<width$} {} {:>9} {:>12} {:>13}\n",
            row.type_name,
            status_cell(row.status, config),
            row.identical,
            count_cell(&row.in_project_only),
            count_cell(&row.in_manifest_only),
            width = width
        ));
    }

    let mut details = String::new();
    for row in &report.rows {
        for member in row.in_project_only.iter().flatten() {
            details.push_str(&format!("  + {}.{} (project only)\n", row.type_name, member));
        }
        for member in row.in_manifest_only.iter().flatten() {
            details.push_str(&format!("  - {}.{} (manifest only)\n", row.type_name, member));
        }
    }
    if !details.is_empty() {
        out.push('\n');
        out.push_str(&details);
    }
    out
}
