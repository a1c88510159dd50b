use bridge_engine::{EngineError, ValueKind};
use thiserror::Error;

/// Failures of the handle layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("relation `{relation}` has an open iterator and cannot be modified")]
    RelationBusy { relation: String },

    #[error("tuple was created for relation `{created_for}`, not `{inserted_into}`")]
    ForeignTuple {
        created_for: String,
        inserted_into: String,
    },

    #[error("read past the last field of a {arity}-field tuple")]
    ReadPastEnd { arity: usize },

    #[error("field {column} is {found}, read as {expected}")]
    ReadKind {
        column: usize,
        expected: ValueKind,
        found: ValueKind,
    },
}
