//! # Scan Command Implementation
//!
//! Builds a manifest from what a project directory contains. The manifest is
//! printed to stdout unless `--output` is given; `--json` prints the member
//! index instead.

use anyhow::{Context as _, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use sfdx_meta::manifest::write_manifest;
use sfdx_meta::output::{mark, Mark};
use sfdx_meta::scanner::{scan_project, ScanOptions};
use sfdx_meta::suggestions;

use super::Context;

/// Arguments for the scan command
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Project directory to scan
    #[arg(value_name = "DIR")]
    pub project: PathBuf,

    /// Write the manifest to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// API version written to the manifest
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Print the member index as JSON
    #[arg(long, conflicts_with = "output")]
    pub json: bool,
}

/// Build scan options from the settings, reporting bad patterns with hints.
pub(crate) fn scan_options(ctx: &Context) -> Result<ScanOptions> {
    for pattern in &ctx.settings.scan.ignore {
        glob::Pattern::new(pattern).map_err(|e| suggestions::invalid_glob(pattern, &e))?;
    }
    Ok(ctx.settings.scan_options()?)
}

/// Execute the scan command.
pub fn execute(args: ScanArgs, ctx: &Context) -> Result<()> {
    if !args.project.is_dir() {
        return Err(suggestions::project_not_found(&args.project));
    }
    let options = scan_options(ctx)?;
    let index = scan_project(&args.project, &options)
        .with_context(|| format!("Failed to scan {}", args.project.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(());
    }

    let version = args
        .api_version
        .as_deref()
        .or(ctx.settings.api_version.as_deref());
    let manifest = write_manifest(&index, version);
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, manifest)?;
            let members: usize = index.values().map(|members| members.len()).sum();
            println!(
                "{} Found {} member(s) of {} type(s), written to {}",
                mark(&ctx.output, Mark::Success),
                members,
                index.len(),
                path.display()
            );
        }
        None => print!("{}", manifest),
    }
    Ok(())
}
