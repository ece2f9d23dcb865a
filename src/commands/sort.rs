//! Sort command implementation
//!
//! Rewrites a manifest in canonical form: types and members sorted, members
//! deduplicated, empty types dropped.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use sfdx_meta::manifest::sort_manifest_file;
use sfdx_meta::output::{mark, Mark};
use sfdx_meta::suggestions;

use super::Context;

/// Arguments for the sort command
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Manifest to sort
    #[arg(value_name = "PATH")]
    pub manifest: PathBuf,

    /// Write here instead of rewriting the manifest in place
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Execute the sort command.
pub fn execute(args: SortArgs, ctx: &Context) -> Result<()> {
    if !args.manifest.is_file() {
        return Err(suggestions::manifest_not_found(&args.manifest));
    }
    let index = sort_manifest_file(
        &args.manifest,
        args.output.as_deref(),
        ctx.settings.api_version.as_deref(),
    )
    .with_context(|| format!("Failed to sort {}", args.manifest.display()))?;

    let target = args.output.as_ref().unwrap_or(&args.manifest);
    println!(
        "{} Sorted {} type(s) into {}",
        mark(&ctx.output, Mark::Success),
        index.len(),
        target.display()
    );
    Ok(())
}
