//! Trellis - entity-relationship workspaces with canonical on-disk files
//!
//! Trellis is a single-binary tool and library for defining a generic
//! entity-relationship schema ("model") with row data ("instance"),
//! persisted as a directory of canonical files and mutated through a
//! closed set of typed operations.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to handlers)
//! - [`engine`] - Transaction coordinator: Snapshot -> Apply -> Validate -> Commit
//! - [`core`] - Domain model, operations, validation, diagnostics
//! - [`codec`] - Canonical, deterministic parse/serialize
//! - [`store`] - Workspace discovery, load/save, lock, fingerprint
//! - [`ui`] - Output formatting
//!
//! # Correctness Invariants
//!
//! 1. A workspace is never persisted in a state that violates its schema
//! 2. All mutations flow through the single transactional coordinator
//! 3. Identical logical content always serializes to byte-identical output
//! 4. A batch of edits is all-or-nothing: any failure restores the
//!    pre-transaction state in full

pub mod cli;
pub mod codec;
pub mod core;
pub mod engine;
pub mod store;
pub mod ui;
