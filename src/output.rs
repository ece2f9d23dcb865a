//! # Terminal Output
//!
//! Colour and symbol selection for human-readable command output.
//!
//! Colour is decided once per run from the `--color` flag and the
//! environment:
//! - `--color=always|never` wins over everything else
//! - `NO_COLOR` (any value) disables colour
//! - `CLICOLOR=0` disables colour, `CLICOLOR_FORCE=1` forces it
//! - `TERM=dumb` disables colour
//! - otherwise colour follows whether stdout is a capable terminal
//!
//! ```rust,ignore
//! use sfdx_meta::output::{OutputConfig, mark, Mark};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} Filtered 12 members", mark(&config, Mark::Success));
//! ```

use std::env;

use console::style;

/// Output settings shared by every command.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether ANSI colours and symbols are written.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve colour usage from the `--color` value and the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // https://no-color.org/: presence alone disables colour
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Configuration with colours enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Configuration with colours disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Line prefixes used in command summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Success,
    Warning,
    Failure,
}

/// Prefix for a summary line: a coloured symbol, or a bracketed word when
/// colour is off.
pub fn mark(config: &OutputConfig, kind: Mark) -> String {
    if !config.use_color {
        return match kind {
            Mark::Success => "[OK]",
            Mark::Warning => "[WARN]",
            Mark::Failure => "[FAIL]",
        }
        .to_string();
    }
    let styled = match kind {
        Mark::Success => style("✓").green(),
        Mark::Warning => style("!").yellow(),
        Mark::Failure => style("✗").red(),
    };
    styled.force_styling(true).bold().to_string()
}

/// Bold heading text when colour is on.
pub fn heading(config: &OutputConfig, text: &str) -> String {
    if config.use_color {
        style(text).force_styling(true).bold().to_string()
    } else {
        text.to_string()
    }
}
