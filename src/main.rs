//! # sfdx-meta CLI
//!
//! Binary entry point for the `sfdx-meta` command-line tool.
//!
//! Its responsibilities are:
//! - parsing command-line arguments using `clap`,
//! - dispatching to the matching command,
//! - turning errors into a non-zero exit status.
//!
//! The metadata logic lives in the library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
