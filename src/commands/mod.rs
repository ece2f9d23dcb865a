//! # CLI Command Implementations
//!
//! One file per subcommand of the `sfdx-meta` tool.
//!
//! ## Structure
//!
//! Each command module contains:
//! - an `Args` struct with the command-specific options, derived using `clap`;
//! - an `execute` function taking the parsed `Args` and the shared
//!   [`Context`].
//!
//! Commands only validate inputs, call into the `sfdx_meta` library and
//! render its results.

use sfdx_meta::config::Settings;
use sfdx_meta::output::OutputConfig;

pub mod compare;
pub mod completions;
pub mod filter;
pub mod merge;
pub mod scan;
pub mod sort;

/// State resolved from global flags before a command runs.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputConfig,
    pub settings: Settings,
}

#[cfg(test)]
impl Context {
    /// Plain output and default settings.
    pub fn for_tests() -> Self {
        Self {
            output: OutputConfig::from_env_and_flag("never"),
            settings: Settings::default(),
        }
    }
}
