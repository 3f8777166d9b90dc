//! # Output Configuration
//!
//! Controls how the CLI presents run results: whether colors and emoji are
//! used, and how route outcomes and warnings are rendered.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use depot_sync::output::{OutputConfig, route_line};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! for report in &sync_report.outcomes {
//!     println!("{}", route_line(&out, report));
//! }
//! ```

use std::env;

use console::style;

use crate::reconcile::{RouteOutcome, RouteReport};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `--color=always` forces colors on (overriding `NO_COLOR`),
    /// `--color=never` forces them off, anything else detects support from
    /// the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence alone disables colors, even if empty
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

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

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

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One summary line for a reconciled route.
pub fn route_line(config: &OutputConfig, report: &RouteReport) -> String {
    let marker = match report.outcome {
        RouteOutcome::UpToDate => emoji(config, "✅", "[OK]"),
        RouteOutcome::Published { .. } => emoji(config, "📦", "[PUBLISHED]"),
        RouteOutcome::Failed(_) => emoji(config, "❌", "[ERR]"),
    };
    let outcome = report.outcome.to_string();
    let outcome = if !config.use_color {
        outcome
    } else if report.outcome.is_failed() {
        style(outcome).red().to_string()
    } else {
        style(outcome).green().to_string()
    };
    format!(
        "{} {} ({}): {}",
        marker, report.track, report.route, outcome
    )
}

/// One line for a skipped asset or similar non-fatal problem.
pub fn warning_line(config: &OutputConfig, message: &str) -> String {
    let marker = emoji(config, "⚠️", "[WARN]");
    if config.use_color {
        format!("{} {}", marker, style(message).yellow())
    } else {
        format!("{} {}", marker, message)
    }
}
