use thiserror::Error;

use crate::value::ValueKind;

/// Failures reported by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),

    #[error("relation `{0}` is declared more than once")]
    DuplicateRelation(String),

    #[error("relation `{relation}` has arity {expected}, got a tuple of {found} fields")]
    Arity {
        relation: String,
        expected: usize,
        found: usize,
    },

    #[error("relation `{relation}` column {column} is {expected}, got {found}")]
    Schema {
        relation: String,
        column: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("expected a tuple of {expected} fields, got {found}")]
    TupleArity { expected: usize, found: usize },

    #[error("column {column} is past the end of a {arity}-field tuple")]
    MissingField { column: usize, arity: usize },

    #[error("column {column} is {found}, expected {expected}")]
    FieldKind {
        column: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("program `{program}` failed: {reason}")]
    Evaluation { program: String, reason: String },
}
