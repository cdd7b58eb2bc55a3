//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output
//! - `--json`: Machine-readable output
//! - `--strict`: Treat warnings as blocking

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use clap_complete::Shell;

/// Trellis - entity-relationship workspaces with canonical on-disk files
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if trellis was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Treat validation warnings as blocking
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new workspace in the current directory
    Init {
        /// Model name
        name: String,
    },

    /// Manage entity definitions
    Entity {
        #[command(subcommand)]
        command: EntityCommand,
    },

    /// Manage property definitions
    Property {
        #[command(subcommand)]
        command: PropertyCommand,
    },

    /// Manage relationship definitions
    Rel {
        #[command(subcommand)]
        command: RelCommand,
    },

    /// Manage row data
    Rows {
        #[command(subcommand)]
        command: RowsCommand,
    },

    /// Validate the workspace and report diagnostics
    Check,

    /// Print the canonical content fingerprint
    Fingerprint,

    /// Generate shell completions
    Completion {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntityCommand {
    /// Add an entity
    Add { name: String },
    /// Delete an entity (must be empty and unreferenced)
    Rm { name: String },
    /// Rename an entity, updating every reference to it
    Rename { name: String, new_name: String },
}

#[derive(Subcommand, Debug)]
pub enum PropertyCommand {
    /// Add a property to an entity
    Add {
        entity: String,
        name: String,
        /// Scalar data type tag
        #[arg(long = "type", default_value = "string")]
        data_type: String,
        /// Allow records to omit a value
        #[arg(long)]
        nullable: bool,
    },
    /// Delete a property, dropping its values from all records
    Rm { entity: String, name: String },
    /// Rename a property, rewriting record keys
    Rename {
        entity: String,
        name: String,
        new_name: String,
    },
    /// Change a property's nullability
    Nullable {
        entity: String,
        name: String,
        /// "true" or "false"
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum RelCommand {
    /// Add a relationship from an entity to a target entity
    Add {
        entity: String,
        target: String,
        /// Role override for the usage name
        #[arg(long)]
        role: Option<String>,
        /// Column-name override
        #[arg(long)]
        column: Option<String>,
    },
    /// Delete a relationship (selector: usage name, else target entity)
    Rm { entity: String, selector: String },
    /// Re-point a relationship at a new target entity
    Retarget {
        entity: String,
        selector: String,
        new_target: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RowsCommand {
    /// Insert or update one record
    Upsert {
        entity: String,
        id: String,
        /// Set a property value: name=value (empty value clears)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,
        /// Set a relationship value: column=target-id (empty clears)
        #[arg(short = 'l', long = "link", value_name = "COLUMN=ID")]
        link: Vec<String>,
        /// Clear all existing values before applying this patch
        #[arg(long)]
        replace: bool,
    },
    /// Delete records by Id (unmatched ids are ignored)
    Rm {
        entity: String,
        ids: Vec<String>,
    },
}
