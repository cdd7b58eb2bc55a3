//! check command - Validate the workspace
//!
//! Read-only: loads, validates, reports diagnostics, and exits non-zero
//! when they block (errors, or warnings under `--strict`). Never writes.

use anyhow::{bail, Result};

use super::load_workspace;
use crate::core::validate::validate;
use crate::engine::Context;
use crate::ui::output::{self, Verbosity};

/// Validate the workspace and report diagnostics.
pub fn check(ctx: &Context) -> Result<()> {
    let workspace = load_workspace(ctx)?;
    let diagnostics = validate(&workspace);
    let verbosity = Verbosity::from_flags(ctx.quiet, ctx.debug);

    output::report_diagnostics(&diagnostics, ctx.json, verbosity);
    if diagnostics.blocks(ctx.strict) {
        bail!("workspace has blocking validation issues");
    }
    output::print("ok", verbosity);
    Ok(())
}
