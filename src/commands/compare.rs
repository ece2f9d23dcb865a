//! # Compare Command Implementation
//!
//! Scans a project and reconciles it with a manifest.
//!
//! ## Exit Codes
//!
//! - 0: the report was printed (mismatches included) or everything matched
//! - 1: `--fail-on-error` was given and a manifest member is missing from the
//!   project, or the inputs could not be read

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use sfdx_meta::manifest::read_index;
use sfdx_meta::output::{mark, Mark};
use sfdx_meta::reconcile::{reconcile, render_table};
use sfdx_meta::scanner::scan_project;
use sfdx_meta::suggestions;

use super::Context;

/// Arguments for the compare command
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Manifest to check
    #[arg(short = 'p', long = "manifest", value_name = "PATH")]
    pub manifest: PathBuf,

    /// Project directory to compare against
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub project: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with an error when a manifest member is missing from the project
    #[arg(long)]
    pub fail_on_error: bool,
}

/// Execute the compare command.
pub fn execute(args: CompareArgs, ctx: &Context) -> Result<()> {
    if !args.manifest.is_file() {
        return Err(suggestions::manifest_not_found(&args.manifest));
    }
    if !args.project.is_dir() {
        return Err(suggestions::project_not_found(&args.project));
    }

    let manifest = read_index(&args.manifest)?;
    let options = super::scan::scan_options(ctx)?;
    let project = scan_project(&args.project, &options)
        .with_context(|| format!("Failed to scan {}", args.project.display()))?;
    let report = reconcile(&manifest, &project);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_table(&report, &ctx.output));
        let kind = if report.success {
            Mark::Success
        } else {
            Mark::Failure
        };
        println!(
            "\n{} {} type(s) compared, {} with missing members",
            mark(&ctx.output, kind),
            report.rows.len(),
            report.failed_types().len()
        );
    }

    if args.fail_on_error || ctx.settings.compare.fail_on_error {
        report.ensure_success()?;
    }
    Ok(())
}
