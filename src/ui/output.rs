//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Output is formatted consistently and respects the quiet flag.
//! When `--json` is enabled, diagnostics are machine-readable JSON.

use std::fmt::Display;

use crate::core::diagnostics::Diagnostics;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        println!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Render diagnostics as one `severity code location: message` line per
/// issue.
pub fn format_diagnostics(diagnostics: &Diagnostics) -> String {
    diagnostics
        .issues()
        .iter()
        .map(|issue| {
            format!(
                "{} {} {}: {}",
                issue.severity, issue.code, issue.location, issue.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render diagnostics as a JSON array.
pub fn diagnostics_json(diagnostics: &Diagnostics) -> String {
    serde_json::to_string_pretty(diagnostics.issues()).expect("diagnostics serialize")
}

/// Print diagnostics in the selected format (respects quiet mode for
/// the text path; JSON always prints, it is the machine interface).
pub fn report_diagnostics(diagnostics: &Diagnostics, json: bool, verbosity: Verbosity) {
    if json {
        println!("{}", diagnostics_json(diagnostics));
    } else if !diagnostics.is_empty() && verbosity != Verbosity::Quiet {
        println!("{}", format_diagnostics(diagnostics));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::diagnostics::{codes, Issue};

    #[test]
    fn text_rendering_is_one_line_per_issue() {
        let mut diags = Diagnostics::new();
        diags.push(Issue::error(
            codes::RELATIONSHIP_CYCLE,
            "model/A/B",
            "relationship cycle through 'A' -> 'B'",
        ));
        let text = format_diagnostics(&diags);
        assert_eq!(
            text,
            "error relationship.cycle model/A/B: relationship cycle through 'A' -> 'B'"
        );
    }

    #[test]
    fn json_rendering_is_an_array() {
        let mut diags = Diagnostics::new();
        diags.push(Issue::warning("x", "model", "w"));
        let json = diagnostics_json(&diags);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["severity"], "warning");
    }
}
