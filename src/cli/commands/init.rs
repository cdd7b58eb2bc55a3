//! init command - Create a new workspace
//!
//! Creates `model.xml` and an empty `data/` directory in the target
//! directory. Fails if a workspace already exists there.

use anyhow::Result;

use super::workspace_root;
use crate::engine::Context;
use crate::store;
use crate::ui::output::{self, Verbosity};

/// Create a new workspace with the given model name.
pub fn init(name: &str, ctx: &Context) -> Result<()> {
    let root = workspace_root(ctx.cwd.as_deref())?;
    store::init(&root, name)?;
    output::print(
        format!("Initialized workspace '{}' in {}", name, root.display()),
        Verbosity::from_flags(ctx.quiet, ctx.debug),
    );
    Ok(())
}
