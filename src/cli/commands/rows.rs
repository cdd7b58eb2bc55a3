//! rows command - Manage row data
//!
//! - `rows upsert <entity> <id> [-s name=value] [-l column=id] [--replace]`
//! - `rows rm <entity> <id>...`
//!
//! An empty value after `=` clears the field. `--replace` clears the
//! whole record before applying the patch.

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use super::{load_workspace, run_and_save};
use crate::cli::args::RowsCommand;
use crate::core::ops::{Operation, RowPatch};
use crate::engine::Context;

/// Handle the `rows` subcommands.
pub fn rows(command: RowsCommand, ctx: &Context) -> Result<()> {
    let operation = match command {
        RowsCommand::Upsert {
            entity,
            id,
            set,
            link,
            replace,
        } => Operation::BulkUpsertRows {
            entity,
            rows: vec![RowPatch {
                id,
                replace,
                values: parse_assignments(&set)?,
                links: parse_assignments(&link)?,
            }],
        },
        RowsCommand::Rm { entity, ids } => Operation::DeleteRows { entity, ids },
    };
    let mut workspace = load_workspace(ctx)?;
    run_and_save(&mut workspace, &[operation], ctx)
}

/// Parse `key=value` pairs; an empty value maps to a clearing patch.
fn parse_assignments(pairs: &[String]) -> Result<BTreeMap<String, Option<String>>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected NAME=VALUE, got '{}'", pair);
        };
        if key.is_empty() {
            bail!("expected NAME=VALUE, got '{}'", pair);
        }
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}
