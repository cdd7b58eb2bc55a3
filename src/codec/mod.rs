//! codec
//!
//! Canonical, deterministic serialization between the domain model and
//! the on-disk file format: one schema document (`model.xml`) plus one
//! data shard per entity (`data/<Entity>.xml`).
//!
//! # Canonicalization
//!
//! - Entities serialize sorted by name (ordinal); properties sorted by
//!   name with the implicit `Id` never emitted; relationships sorted by
//!   column name then target name.
//! - Omit-if-default: `Type` when `"string"`, `Nullable` when required,
//!   `Plural` when name + "s", `Role`/`Column` when equal to the derived
//!   default.
//! - Data rows sort by Id; relationship values are attributes on the row
//!   element in relationship sort order; property values are child
//!   elements sorted by name and omitted entirely when absent.
//! - Two-space indent, `\n` line endings, no document declaration.
//!
//! # Laws
//!
//! - Round-trip: `parse(serialize(x))` is structurally equal to `x` for
//!   any canonically-ordered workspace `x`.
//! - Determinism: `serialize(x)` is byte-identical across repeated calls,
//!   processes, and machines.
//!
//! # Defense in depth
//!
//! The writer re-validates before emission: a record referencing an
//! unknown entity/property/relationship, a record missing a required
//! relationship value, or any identifier outside
//! `[A-Za-z_][A-Za-z0-9_]*` fails serialization rather than emitting a
//! non-canonical or lossy document. The parser accepts only the fixed
//! vocabulary and reports syntax errors with line/column context; it is
//! lenient about element *order* (the next save canonicalizes it) but
//! strict about everything else.

mod escape;
mod parser;
mod writer;

use thiserror::Error;

pub use parser::{parse_model, parse_shard};
pub use writer::{serialize_model, serialize_shard};

/// Errors from parsing or serializing canonical documents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Syntax or vocabulary error in an on-disk document.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// An identifier fails the strict `[A-Za-z_][A-Za-z0-9_]*` pattern.
    #[error("cannot serialize: identifier '{name}' is not a valid identifier")]
    InvalidIdentifier { name: String },

    /// A shard was requested for an entity the model does not define.
    #[error("cannot serialize: unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    /// A record carries a value for a property the schema lacks.
    #[error("cannot serialize: record '{id}' of '{entity}' references unknown property '{property}'")]
    UnknownProperty {
        entity: String,
        id: String,
        property: String,
    },

    /// A record carries a link under a column the schema lacks.
    #[error("cannot serialize: record '{id}' of '{entity}' references unknown relationship column '{column}'")]
    UnknownRelationship {
        entity: String,
        id: String,
        column: String,
    },

    /// A record is missing a required relationship value.
    #[error("cannot serialize: record '{id}' of '{entity}' is missing required relationship '{column}'")]
    MissingRelationship {
        entity: String,
        id: String,
        column: String,
    },

    /// A record has an empty Id.
    #[error("cannot serialize: record of '{entity}' has an empty Id")]
    EmptyRecordId { entity: String },
}
