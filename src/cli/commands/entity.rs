//! entity command - Manage entity definitions
//!
//! - `entity add <name>`
//! - `entity rm <name>` - refused while the entity has records or
//!   inbound relationships
//! - `entity rename <name> <new-name>` - updates the entity, its record
//!   bucket, and every relationship and record link pointing at it

use anyhow::Result;

use super::{load_workspace, run_and_save};
use crate::cli::args::EntityCommand;
use crate::core::ops::Operation;
use crate::engine::Context;

/// Handle the `entity` subcommands.
pub fn entity(command: EntityCommand, ctx: &Context) -> Result<()> {
    let operation = match command {
        EntityCommand::Add { name } => Operation::AddEntity { name },
        EntityCommand::Rm { name } => Operation::DeleteEntity { name },
        EntityCommand::Rename { name, new_name } => Operation::RenameEntity { name, new_name },
    };
    let mut workspace = load_workspace(ctx)?;
    run_and_save(&mut workspace, &[operation], ctx)
}
