//! core::naming
//!
//! Identifier rules shared by the operation applier, the validation
//! engine, and the canonical codec.
//!
//! # Rules
//!
//! - Identifiers (model, entity, property, relationship usage/column
//!   names) must match `[A-Za-z_][A-Za-z0-9_]*`.
//! - Identifier comparison is case-insensitive. Comparison always goes
//!   through [`fold`] / [`eq_ignore_case`]; no collection type in the
//!   crate carries ambient case-insensitive semantics.

/// Check whether a string is a valid identifier.
///
/// Valid identifiers match `[A-Za-z_][A-Za-z0-9_]*`.
///
/// # Example
///
/// ```
/// use trellis::core::naming::is_valid_identifier;
///
/// assert!(is_valid_identifier("Cube"));
/// assert!(is_valid_identifier("_internal2"));
/// assert!(!is_valid_identifier(""));
/// assert!(!is_valid_identifier("9lives"));
/// assert!(!is_valid_identifier("has space"));
/// ```
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalize an identifier for case-insensitive keying.
///
/// Identifiers are ASCII by construction, so ASCII lowercasing is a
/// total normalization.
pub fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Case-insensitive identifier equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
