//! core
//!
//! Domain types, validation, and operations for entity-relationship
//! workspaces.
//!
//! # Modules
//!
//! - [`model`] / [`instance`] / [`workspace`] - the in-memory domain
//! - [`ops`] - the closed set of typed mutations and their applier
//! - [`validate`] / [`diagnostics`] - whole-workspace consistency
//! - [`graph`] - relationship graph and cycle detection
//! - [`naming`] / [`keywords`] - identifier rules and reserved words
//! - [`config`] / [`paths`] - configuration and storage routing

pub mod config;
pub mod diagnostics;
pub mod graph;
pub mod instance;
pub mod keywords;
pub mod model;
pub mod naming;
pub mod ops;
pub mod paths;
pub mod validate;
pub mod workspace;
