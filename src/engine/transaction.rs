//! engine::transaction
//!
//! The snapshot/apply/validate/commit-or-rollback protocol.
//!
//! # Protocol
//!
//! 1. Snapshot: deep-clone model + instance (diagnostics excluded).
//! 2. Apply each operation in order. The first failure restores the
//!    snapshot immediately and surfaces that operation's error; validate
//!    is not run in that case.
//! 3. Validate the mutated workspace.
//! 4. If the diagnostics block (errors, or warnings under strict mode),
//!    restore the snapshot and report the diagnostics as the failure.
//!    Otherwise keep the mutated state, mark the workspace dirty, and
//!    return the diagnostics; non-blocking warnings may be persisted.
//!
//! # Invariants
//!
//! - A failed transaction leaves model and instance byte-identical to
//!   their pre-transaction state
//! - Operation failure never triggers a validation pass

use thiserror::Error;

use crate::core::diagnostics::Diagnostics;
use crate::core::ops::{apply, Operation, OperationError};
use crate::core::validate::validate;
use crate::core::workspace::Workspace;

/// Errors from a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// An operation's local guard failed; the workspace was rolled back.
    #[error("operation {index} failed: {source}")]
    Operation {
        /// Zero-based position of the failing operation in the batch.
        index: usize,
        source: OperationError,
    },

    /// Validation found blocking issues; the workspace was rolled back.
    #[error("validation rejected the transaction with {blocking} blocking issue(s)")]
    Rejected {
        /// Issues that actually blocked under the mode in effect; the
        /// full set may also carry non-blocking infos and warnings.
        blocking: usize,
        diagnostics: Diagnostics,
    },
}

/// Run a batch of operations atomically against the workspace.
///
/// On success the workspace is dirty and its diagnostics field holds the
/// returned (non-blocking) diagnostics. On failure the workspace's model
/// and instance are exactly as before the call.
pub fn run_transaction(
    workspace: &mut Workspace,
    operations: &[Operation],
    strict: bool,
) -> Result<Diagnostics, TransactionError> {
    let snapshot = workspace.snapshot();

    for (index, op) in operations.iter().enumerate() {
        if let Err(source) = apply(workspace, op) {
            workspace.restore(snapshot);
            return Err(TransactionError::Operation { index, source });
        }
    }

    let diagnostics = validate(workspace);
    if diagnostics.blocks(strict) {
        workspace.restore(snapshot);
        return Err(TransactionError::Rejected {
            blocking: diagnostics.blocking_len(strict),
            diagnostics,
        });
    }

    workspace.diagnostics = diagnostics.clone();
    workspace.dirty = true;
    Ok(diagnostics)
}
