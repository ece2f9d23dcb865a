//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use sfdx_meta::config;
use sfdx_meta::defaults::CONFIG_ENV_VAR;
use sfdx_meta::output::OutputConfig;
use sfdx_meta::suggestions;

use crate::commands::{self, Context};

/// sfdx-meta - Filter, merge and check Salesforce metadata against package.xml manifests
#[derive(Parser, Debug)]
#[command(name = "sfdx-meta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Settings file (defaults to .sfdx-meta.yaml, then the user config directory)
    #[arg(long, global = true, value_name = "PATH", env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the part of a project selected by one or more manifests
    Filter(commands::filter::FilterArgs),

    /// Merge manifests into one, reporting duplicate members
    Merge(commands::merge::MergeArgs),

    /// Rewrite a manifest with sorted, deduplicated types and members
    Sort(commands::sort::SortArgs),

    /// Build a manifest from the contents of a project
    Scan(commands::scan::ScanArgs),

    /// Compare a manifest with the contents of a project
    Compare(commands::compare::CompareArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when running inside tests
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}

fn load_context(color: &str, config_path: Option<&Path>) -> Result<Context> {
    if let Some(path) = config_path {
        if !path.is_file() {
            return Err(suggestions::config_not_found(path));
        }
    }
    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let settings = config::load(config_path, &working_dir)?;
    Ok(Context {
        output: OutputConfig::from_env_and_flag(color),
        settings,
    })
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let color = self.color.as_str();
        let config_path = self.config.as_deref();
        match self.command {
            Commands::Filter(args) => {
                commands::filter::execute(args, &load_context(color, config_path)?)
            }
            Commands::Merge(args) => {
                commands::merge::execute(args, &load_context(color, config_path)?)
            }
            Commands::Sort(args) => commands::sort::execute(args, &load_context(color, config_path)?),
            Commands::Scan(args) => commands::scan::execute(args, &load_context(color, config_path)?),
            Commands::Compare(args) => {
                commands::compare::execute(args, &load_context(color, config_path)?)
            }
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_with_several_manifests() {
        let cli = Cli::try_parse_from([
            "sfdx-meta", "filter", "-p", "a.xml", "b.xml", "-i", "src", "-o", "out",
        ])
        .unwrap();
        match cli.command {
            Commands::Filter(args) => {
                assert_eq!(args.manifests.len(), 2);
                assert_eq!(args.input, PathBuf::from("src"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sfdx-meta", "sort", "package.xml", "--color", "never", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.color, "never");
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_missing_required_argument_is_usage_error() {
        let err = Cli::try_parse_from(["sfdx-meta", "filter", "-i", "src"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
