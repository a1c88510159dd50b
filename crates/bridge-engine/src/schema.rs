//! Relation declarations.

use std::fmt;

use crate::value::ValueKind;

/// How a relation participates in evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationRole {
    /// Loaded by the caller before a run.
    Input,
    /// Derived during a run, not meant to be read back.
    Internal,
    /// Derived during a run and read back by the caller.
    Output,
    /// Loaded by the caller and also read back after a run.
    InputOutput,
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: ValueKind,
}

/// A relation declaration: name, role and column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDecl {
    pub name: String,
    pub role: RelationRole,
    pub attributes: Vec<Attribute>,
}

impl RelationRole {
    pub fn is_input(self) -> bool {
        matches!(self, RelationRole::Input | RelationRole::InputOutput)
    }

    pub fn is_output(self) -> bool {
        matches!(self, RelationRole::Output | RelationRole::InputOutput)
    }

    pub fn is_internal(self) -> bool {
        self == RelationRole::Internal
    }
}

impl fmt::Display for RelationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RelationRole::Input => "input",
            RelationRole::Internal => "internal",
            RelationRole::Output => "output",
            RelationRole::InputOutput => "input/output",
        })
    }
}

impl RelationDecl {
    /// Start a declaration with no columns.
    pub fn new(name: impl Into<String>, role: RelationRole) -> Self {
        Self {
            name: name.into(),
            role,
            attributes: Vec::new(),
        }
    }

    /// Append a column.
    pub fn column(mut self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Column kinds in schema order.
    pub fn kinds(&self) -> impl Iterator<Item = ValueKind> + '_ {
        self.attributes.iter().map(|a| a.kind)
    }
}

impl fmt::Display for RelationDecl {
    /// Formats as `name(a: unsigned, b: symbol)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", attr.name, attr.kind)?;
        }
        write!(f, ")")
    }
}
