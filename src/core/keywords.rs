//! core::keywords
//!
//! Reserved-keyword tables for the two generation targets.
//!
//! No identifier in a workspace (model name, entity name, property name,
//! relationship usage/column name) may equal a reserved keyword of either
//! target language. Matching is case-insensitive; the tables themselves
//! are stored lowercase and never change at runtime.

use crate::core::naming::fold;

/// C# reserved keywords (the fixed keyword set, not contextual keywords).
pub const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// SQL reserved keywords (common ANSI/T-SQL reserved set).
pub const SQL_KEYWORDS: &[&str] = &[
    "add", "all", "alter", "and", "any", "as", "asc", "between", "by", "case", "cast", "check",
    "column", "commit", "constraint", "create", "cross", "current", "database", "declare",
    "default", "delete", "desc", "distinct", "drop", "else", "end", "escape", "except",
    "exec", "exists", "foreign", "from", "full", "function", "grant", "group", "having",
    "identity", "in", "index", "inner", "insert", "intersect", "into", "is", "join", "key",
    "left", "like", "merge", "not", "null", "on", "or", "order", "outer", "primary",
    "procedure", "references", "revoke", "right", "rollback", "rowcount", "schema", "select",
    "set", "table", "then", "to", "top", "transaction", "trigger", "union", "unique",
    "update", "user", "values", "view", "when", "where", "while", "with",
];

/// Check whether an identifier is a reserved C# keyword.
pub fn is_csharp_keyword(name: &str) -> bool {
    CSHARP_KEYWORDS.binary_search(&fold(name).as_str()).is_ok()
}

/// Check whether an identifier is a reserved SQL keyword.
pub fn is_sql_keyword(name: &str) -> bool {
    SQL_KEYWORDS.binary_search(&fold(name).as_str()).is_ok()
}
