//! property command - Manage property definitions
//!
//! The implicit `Id` property is never a valid target here; the
//! operation applier rejects it.

use anyhow::Result;

use super::{load_workspace, run_and_save};
use crate::cli::args::PropertyCommand;
use crate::core::model::Property;
use crate::core::ops::Operation;
use crate::engine::Context;

/// Handle the `property` subcommands.
pub fn property(command: PropertyCommand, ctx: &Context) -> Result<()> {
    let operation = match command {
        PropertyCommand::Add {
            entity,
            name,
            data_type,
            nullable,
        } => Operation::AddProperty {
            entity,
            property: Property {
                name,
                data_type,
                nullable,
            },
        },
        PropertyCommand::Rm { entity, name } => Operation::DeleteProperty {
            entity,
            property: name,
        },
        PropertyCommand::Rename {
            entity,
            name,
            new_name,
        } => Operation::RenameProperty {
            entity,
            property: name,
            new_name,
        },
        PropertyCommand::Nullable {
            entity,
            name,
            value,
        } => Operation::ChangeNullability {
            entity,
            property: name,
            nullable: value,
        },
    };
    let mut workspace = load_workspace(ctx)?;
    run_and_save(&mut workspace, &[operation], ctx)
}
