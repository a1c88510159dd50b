//! Field values stored in relations.

use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;

/// A single field of a tuple.
///
/// The variant set mirrors the attribute types a compiled program can
/// declare. Ordering is derived, so tuples compare lexicographically with
/// the variant tag first.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// Unsigned 32-bit number.
    Unsigned(u32),
    /// Signed 32-bit number.
    Signed(i32),
    /// Interned text.
    Symbol(Arc<str>),
}

/// The kind of a [`Value`], as declared on a relation attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unsigned,
    Signed,
    Symbol,
}

/// A tuple of values, used as a row in a relation.
pub type Tuple = Vec<Value>;

impl Value {
    /// Create a symbol value.
    pub fn symbol(s: impl AsRef<str>) -> Self {
        Value::Symbol(Arc::from(s.as_ref()))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unsigned(_) => ValueKind::Unsigned,
            Value::Signed(_) => ValueKind::Signed,
            Value::Symbol(_) => ValueKind::Symbol,
        }
    }

    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            Value::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_signed(&self) -> Option<i32> {
        match self {
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl ValueKind {
    /// Attribute type name as written in a relation declaration.
    pub fn type_name(self) -> &'static str {
        match self {
            ValueKind::Unsigned => "unsigned",
            ValueKind::Signed => "number",
            ValueKind::Symbol => "symbol",
        }
    }

    /// Parse one textual field into a value of this kind.
    ///
    /// Symbols are taken verbatim; numbers must parse completely.
    pub fn parse(self, field: &str) -> Option<Value> {
        match self {
            ValueKind::Unsigned => field.trim().parse().ok().map(Value::Unsigned),
            ValueKind::Signed => field.trim().parse().ok().map(Value::Signed),
            ValueKind::Symbol => Some(Value::symbol(field)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v}u"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Symbol(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Symbol(s) => f.write_str(s),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Unsigned(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Signed(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::symbol(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Symbol(Arc::from(v))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::Symbol(v)
    }
}

/// Conversion out of a single field.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for u32 {
    const KIND: ValueKind = ValueKind::Unsigned;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_unsigned()
    }
}

impl FromValue for i32 {
    const KIND: ValueKind = ValueKind::Signed;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_signed()
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::Symbol;

    fn from_value(value: &Value) -> Option<Self> {
        value.as_symbol().map(str::to_owned)
    }
}

impl FromValue for Arc<str> {
    const KIND: ValueKind = ValueKind::Symbol;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Symbol(s) => Some(Arc::clone(s)),
            _ => None,
        }
    }
}

/// Conversion of a whole row into a Rust tuple.
pub trait FromTuple: Sized {
    fn from_tuple(values: &[Value]) -> Result<Self, EngineError>;
}

/// Conversion of a Rust tuple into a row.
pub trait IntoTuple {
    fn into_tuple(self) -> Tuple;
}

fn field<T: FromValue>(values: &[Value], column: usize) -> Result<T, EngineError> {
    let value = values.get(column).ok_or(EngineError::MissingField {
        column,
        arity: values.len(),
    })?;
    T::from_value(value).ok_or(EngineError::FieldKind {
        column,
        expected: T::KIND,
        found: value.kind(),
    })
}

macro_rules! tuple_impls {
    ($arity:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromTuple for ($($name,)+) {
            fn from_tuple(values: &[Value]) -> Result<Self, EngineError> {
                if values.len() != $arity {
                    return Err(EngineError::TupleArity {
                        expected: $arity,
                        found: values.len(),
                    });
                }
                Ok(($(field::<$name>(values, $idx)?,)+))
            }
        }

        impl<$($name: Into<Value>),+> IntoTuple for ($($name,)+) {
            fn into_tuple(self) -> Tuple {
                vec![$(self.$idx.into()),+]
            }
        }
    };
}

tuple_impls!(1 => A: 0);
tuple_impls!(2 => A: 0, B: 1);
tuple_impls!(3 => A: 0, B: 1, C: 2);
tuple_impls!(4 => A: 0, B: 1, C: 2, D: 3);
