//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each mutating command handler:
//! 1. Loads the workspace from the resolved root
//! 2. Builds one or more operations
//! 3. Runs them through the transaction coordinator
//! 4. Reports diagnostics and saves on success
//!
//! Handlers do NOT mutate the workspace outside a transaction.

mod check;
mod completion;
mod entity;
mod fingerprint;
mod init;
mod property;
mod relationship;
mod rows;

// Re-export command functions for testing and direct invocation
pub use check::check;
pub use completion::completion;
pub use entity::entity;
pub use fingerprint::fingerprint;
pub use init::init;
pub use property::property;
pub use relationship::rel;
pub use rows::rows;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};

use crate::cli::args::Command;
use crate::core::ops::Operation;
use crate::core::workspace::Workspace;
use crate::engine::{run_transaction, Context, TransactionError};
use crate::store;
use crate::ui::output::{self, Verbosity};

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init { name } => init(&name, ctx),
        Command::Entity { command } => entity(command, ctx),
        Command::Property { command } => property(command, ctx),
        Command::Rel { command } => rel(command, ctx),
        Command::Rows { command } => rows(command, ctx),
        Command::Check => check(ctx),
        Command::Fingerprint => fingerprint(ctx),
        Command::Completion { shell } => completion(shell),
    }
}

/// Resolve the workspace root from the `--cwd` flag or the process cwd.
pub fn workspace_root(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(path) => Ok(path.to_path_buf()),
        None => std::env::current_dir().context("cannot determine current directory"),
    }
}

/// Load the workspace for a command.
pub(crate) fn load_workspace(ctx: &Context) -> Result<Workspace> {
    let root = workspace_root(ctx.cwd.as_deref())?;
    Ok(store::load(&root)?)
}

/// Run one transaction, report its diagnostics, and persist on success.
///
/// An operation guard failure or blocking diagnostics roll the workspace
/// back and fail the command; nothing is written in that case.
pub(crate) fn run_and_save(
    workspace: &mut Workspace,
    operations: &[Operation],
    ctx: &Context,
) -> Result<()> {
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);
    match run_transaction(workspace, operations, ctx.strict) {
        Ok(diagnostics) => {
            output::report_diagnostics(&diagnostics, ctx.json, verbosity);
            store::save(workspace)?;
            output::debug(
                format!("applied {} operation(s)", operations.len()),
                verbosity,
            );
            Ok(())
        }
        Err(TransactionError::Rejected { diagnostics, .. }) => {
            output::report_diagnostics(&diagnostics, ctx.json, verbosity);
            bail!("transaction rejected by validation; workspace rolled back")
        }
        Err(err @ TransactionError::Operation { .. }) => Err(err.into()),
    }
}
