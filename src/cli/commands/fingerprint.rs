//! fingerprint command - Print the canonical content hash
//!
//! Stable across repeated saves without reloading; downstream diffing
//! and change detection rely on it.

use anyhow::Result;

use super::load_workspace;
use crate::engine::Context;
use crate::store::Fingerprint;

/// Print the canonical content fingerprint.
pub fn fingerprint(ctx: &Context) -> Result<()> {
    let workspace = load_workspace(ctx)?;
    let fingerprint = Fingerprint::compute(&workspace)?;
    println!("{}", fingerprint);
    Ok(())
}
