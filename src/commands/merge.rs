//! # Merge Command Implementation
//!
//! Merges several manifests into one sorted manifest.
//!
//! Members declared in more than one input are reported. With `--strict`
//! (or `merge.fail_on_duplicate` in the settings file) they fail the run,
//! except for types listed with `--ignore-duplicates`.

use anyhow::Result;
use clap::Args;
use log::warn;
use std::fs;
use std::path::PathBuf;

use sfdx_meta::error::Error;
use sfdx_meta::manifest::{merge_manifests, write_manifest, MergeReport, Severity};
use sfdx_meta::output::{mark, Mark};
use sfdx_meta::registry;
use sfdx_meta::suggestions;

use super::Context;

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Manifests to merge, in order
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub manifests: Vec<PathBuf>,

    /// File to write the merged manifest to
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Fail when the same member appears in several manifests
    #[arg(long)]
    pub strict: bool,

    /// Only warn about duplicates of this type (repeatable)
    #[arg(long = "ignore-duplicates", value_name = "TYPE")]
    pub ignore_duplicates: Vec<String>,

    /// Print the duplicate report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the merge command.
pub fn execute(args: MergeArgs, ctx: &Context) -> Result<()> {
    for manifest in &args.manifests {
        if !manifest.is_file() {
            return Err(suggestions::manifest_not_found(manifest));
        }
    }

    let mut options = ctx.settings.merge_options();
    options.fail_on_duplicate |= args.strict;
    for type_name in &args.ignore_duplicates {
        if registry::find_type(type_name).is_none() {
            warn!("{}", suggestions::unknown_type(type_name));
        }
        options.ignored_duplicate_types.insert(type_name.clone());
    }

    let report = match merge_manifests(&args.manifests, &options) {
        Ok(report) => report,
        Err(err @ Error::ManifestConflict { .. }) => return Err(suggestions::merge_conflict(err)),
        Err(err) => return Err(err.into()),
    };

    let version = report
        .version
        .as_deref()
        .or(ctx.settings.api_version.as_deref());
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.output, write_manifest(&report.index, version))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.duplicates)?);
    } else {
        print_report(&report, &args, ctx);
    }
    Ok(())
}

fn print_report(report: &MergeReport, args: &MergeArgs, ctx: &Context) {
    for item in &report.duplicates {
        let kind = match item.severity {
            Severity::Warning => Mark::Warning,
            Severity::Error => Mark::Failure,
        };
        println!(
            "{} {}: {} (again in {})",
            mark(&ctx.output, kind),
            item.type_name,
            item.members.join(", "),
            item.path.display()
        );
    }
    let members: usize = report.index.values().map(|members| members.len()).sum();
    println!(
        "{} Merged {} manifest(s) into {} ({} type(s), {} member(s))",
        mark(&ctx.output, Mark::Success),
        args.manifests.len(),
        args.output.display(),
        report.index.len(),
        members
    );
}
