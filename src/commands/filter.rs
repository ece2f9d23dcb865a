//! # Filter Command Implementation
//!
//! Copies the part of a project selected by one or more manifests into a
//! fresh output directory.
//!
//! ```bash
//! sfdx-meta filter -p manifest/package.xml -i src -o deploy
//! sfdx-meta filter -p base.xml -p feature.xml -i src -o deploy --json
//! ```
//!
//! The output directory is removed and recreated on every run.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;

use sfdx_meta::filter::{filter_project, FilterRequest, FilterSummary};
use sfdx_meta::output::{heading, mark, Mark};
use sfdx_meta::suggestions;

use super::Context;

/// Arguments for the filter command
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Manifest(s) selecting what to copy; merged when several are given
    #[arg(short = 'p', long = "manifest", value_name = "PATH", required = true, num_args = 1..)]
    pub manifests: Vec<PathBuf>,

    /// Project directory to read from
    #[arg(short, long, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory to write to (removed first when it exists)
    #[arg(short, long, value_name = "DIR")]
    pub output: PathBuf,

    /// Worker threads for object and translation pruning
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress the summary
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the filter command.
pub fn execute(args: FilterArgs, ctx: &Context) -> Result<()> {
    for manifest in &args.manifests {
        if !manifest.is_file() {
            return Err(suggestions::manifest_not_found(manifest));
        }
    }
    if !args.input.is_dir() {
        return Err(suggestions::project_not_found(&args.input));
    }

    let jobs = args
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| ctx.settings.jobs());

    let request = FilterRequest {
        manifest_paths: args.manifests,
        input: args.input,
        output: args.output,
        jobs,
    };
    let summary = filter_project(&request).with_context(|| {
        format!(
            "Failed to filter {} into {}",
            request.input.display(),
            request.output.display()
        )
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !args.quiet {
        print_summary(&summary, &request, ctx);
    }
    Ok(())
}

fn print_summary(summary: &FilterSummary, request: &FilterRequest, ctx: &Context) {
    println!("{}", heading(&ctx.output, "Filter summary"));
    for (type_name, count) in &summary.copied {
        println!("  {:<32} {:>6}", type_name, count);
    }
    if !summary.objects.is_empty() {
        println!("  {:<32} {:>6}", "objects", summary.objects.len());
    }
    if !summary.translations.is_empty() {
        println!("  {:<32} {:>6}", "object translations", summary.translations.len());
    }
    for skipped in &summary.skipped {
        println!("{} {}", mark(&ctx.output, Mark::Warning), skipped);
    }
    println!(
        "{} Wrote {} member(s) to {}",
        mark(&ctx.output, Mark::Success),
        summary.total_copied() + summary.objects.len() + summary.translations.len(),
        request.output.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest_has_hint() {
        let temp = TempDir::new().unwrap();
        let args = FilterArgs {
            manifests: vec![temp.path().join("missing.xml")],
            input: temp.path().to_path_buf(),
            output: temp.path().join("out"),
            jobs: None,
            json: false,
            quiet: true,
        };
        let message = execute(args, &Context::for_tests()).unwrap_err().to_string();
        assert!(message.contains("Manifest not found"));
        assert!(message.contains("hint:"));
    }

    #[test]
    fn test_filters_into_output() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("classes")).unwrap();
        fs::write(src.join("classes/Foo.cls"), "x").unwrap();
        fs::write(src.join("classes/Bar.cls"), "y").unwrap();
        let manifest = temp.path().join("package.xml");
        fs::write(
            &manifest,
            "<Package><types><members>Foo</members><name>ApexClass</name></types></Package>",
        )
        .unwrap();

        let args = FilterArgs {
            manifests: vec![manifest],
            input: src,
            output: temp.path().join("out"),
            jobs: Some(1),
            json: false,
            quiet: true,
        };
        execute(args, &Context::for_tests()).unwrap();

        assert!(temp.path().join("out/classes/Foo.cls").is_file());
        assert!(!temp.path().join("out/classes/Bar.cls").exists());
    }
}
