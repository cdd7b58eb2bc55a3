//! engine
//!
//! Orchestrates the transaction lifecycle: Snapshot -> Apply -> Validate
//! -> Commit-or-Rollback.
//!
//! # Architecture
//!
//! Every mutating command flows through [`transaction::run_transaction`].
//! Operations enforce only *local* guards; the transaction makes a
//! multi-operation edit atomic with respect to *global* consistency by
//! validating the mutated workspace and restoring the snapshot when the
//! result is inconsistent.
//!
//! # Invariants
//!
//! - The workspace is mutated only between snapshot and commit
//! - Any operation failure restores the snapshot before surfacing
//! - Blocking diagnostics restore the snapshot in full

pub mod transaction;

pub use transaction::{run_transaction, TransactionError};

/// Execution context carried from CLI flags into command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Run as if started in this directory.
    pub cwd: Option<std::path::PathBuf>,
    /// Enable debug output.
    pub debug: bool,
    /// Minimal output.
    pub quiet: bool,
    /// Machine-readable JSON output.
    pub json: bool,
    /// Treat warnings as blocking.
    pub strict: bool,
}
