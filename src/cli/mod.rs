//! cli
//!
//! Command-line interface layer for Trellis.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Delegate to command handlers
//! - Does NOT mutate the workspace directly
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! command handlers, each of which builds one or more operations and
//! runs them through [`crate::engine::transaction`]. All workspace
//! mutations flow through that single transactional path.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;

use crate::core::config::Config;
use crate::engine;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let root = commands::workspace_root(cli.cwd.as_deref())?;
    let config = Config::load(Some(&root))?;

    // CLI flags override config-file defaults.
    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        json: cli.json || config.json(),
        strict: cli.strict || config.strict(),
    };

    commands::dispatch(cli.command, &ctx)
}
