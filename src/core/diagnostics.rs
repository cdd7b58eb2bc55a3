//! core::diagnostics
//!
//! Validation output: issues with a code, severity, message, and a
//! structured location path.
//!
//! # Location paths
//!
//! - `model`, `model/<Entity>`, `model/<Entity>/<member>`
//! - `instance/<Entity>/<id>/property/<name>`
//! - `instance/<Entity>/<id>/relationship/<Column>/<target-id>`
//!
//! Locations are stable strings meant for tooling; human rendering is a
//! caller concern (see [`crate::ui::output`]).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity. Ordering is `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Issue codes produced by validation.
pub mod codes {
    pub const MODEL_NAME_COLLISION: &str = "model.name.collision";
    pub const ENTITY_NAME_COLLISION: &str = "entity.name.collision";
    pub const ENTITY_MEMBER_COLLISION: &str = "entity.member.collision";
    pub const RESERVED_CSHARP: &str = "identifier.reserved.csharp";
    pub const RESERVED_SQL: &str = "identifier.reserved.sql";
    pub const RELATIONSHIP_CYCLE: &str = "relationship.cycle";
    pub const RELATIONSHIP_UNKNOWN_TARGET: &str = "relationship.unknown-target";
    pub const RELATIONSHIP_MISSING: &str = "relationship.missing";
    pub const RELATIONSHIP_ORPHAN: &str = "relationship.orphan";
    pub const PROPERTY_REQUIRED_MISSING: &str = "property.required.missing";
    pub const RECORD_ID_DUPLICATE: &str = "record.id.duplicate";
    pub const RECORD_UNKNOWN_ENTITY: &str = "record.unknown-entity";
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Stable machine-readable code, e.g. `relationship.cycle`.
    pub code: String,
    pub severity: Severity,
    /// Context for the caller to render; never end-user formatted here.
    pub message: String,
    /// Structured location path.
    pub location: String,
}

impl Issue {
    /// Create an error-severity issue.
    pub fn error(code: &str, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message: message.into(),
            location: location.into(),
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(code: &str, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Warning,
            message: message.into(),
            location: location.into(),
        }
    }
}

/// An ordered collection of issues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    issues: Vec<Issue>,
}

impl Diagnostics {
    /// Create an empty diagnostics set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// All issues in report order.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether any issue is Error severity.
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// Whether any issue is Warning severity.
    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    /// Whether this set blocks a commit: errors always block, warnings
    /// block only under strict mode.
    pub fn blocks(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }

    /// Number of issues that block a commit under the given mode.
    pub fn blocking_len(&self, strict: bool) -> usize {
        self.issues
            .iter()
            .filter(|i| match i.severity {
                Severity::Error => true,
                Severity::Warning => strict,
                Severity::Info => false,
            })
            .count()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn blocking_respects_strict_mode() {
        let mut diags = Diagnostics::new();
        assert!(!diags.blocks(true));

        diags.push(Issue::warning("x", "model", "w"));
        assert!(!diags.blocks(false));
        assert!(diags.blocks(true));

        diags.push(Issue::error("y", "model", "e"));
        assert!(diags.blocks(false));
        assert!(diags.has_errors());
    }

    #[test]
    fn blocking_len_counts_by_mode() {
        let mut diags = Diagnostics::new();
        diags.push(Issue::warning("x", "model", "w"));
        diags.push(Issue::error("y", "model", "e"));
        assert_eq!(diags.blocking_len(false), 1);
        assert_eq!(diags.blocking_len(true), 2);
    }
}
