//! rel command - Manage relationship definitions
//!
//! Selectors resolve by usage name first, else by target entity name;
//! ambiguous selectors fail closed rather than guessing.

use anyhow::Result;

use super::{load_workspace, run_and_save};
use crate::cli::args::RelCommand;
use crate::core::ops::Operation;
use crate::engine::Context;

/// Handle the `rel` subcommands.
pub fn rel(command: RelCommand, ctx: &Context) -> Result<()> {
    let operation = match command {
        RelCommand::Add {
            entity,
            target,
            role,
            column,
        } => Operation::AddRelationship {
            entity,
            target,
            role,
            column,
        },
        RelCommand::Rm { entity, selector } => Operation::DeleteRelationship { entity, selector },
        RelCommand::Retarget {
            entity,
            selector,
            new_target,
        } => Operation::RenameRelationship {
            entity,
            selector,
            new_target,
        },
    };
    let mut workspace = load_workspace(ctx)?;
    run_and_save(&mut workspace, &[operation], ctx)
}
