//! Tuples being built for insertion, and tuples being read during iteration.

use bridge_engine::{FromTuple, FromValue, Tuple, Value, ValueKind};

use crate::error::BridgeError;
use crate::relation::Relation;

/// A tuple under construction, bound to the relation that created it.
///
/// Fields are appended left to right. The schema is checked on insert.
#[derive(Debug)]
pub struct WriteTuple<'p> {
    relation: Relation<'p>,
    values: Tuple,
}

impl<'p> WriteTuple<'p> {
    pub(crate) fn new(relation: Relation<'p>) -> Self {
        WriteTuple {
            relation,
            values: Vec::with_capacity(relation.arity()),
        }
    }

    pub fn append_number(&mut self, n: u32) -> &mut Self {
        self.append(n)
    }

    pub fn append_signed(&mut self, n: i32) -> &mut Self {
        self.append(n)
    }

    pub fn append_text(&mut self, s: &str) -> &mut Self {
        self.append(s)
    }

    pub fn append(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    /// Fields appended so far.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// The relation this tuple was created for.
    pub fn relation(&self) -> Relation<'p> {
        self.relation
    }

    pub(crate) fn into_values(self) -> Tuple {
        self.values
    }
}

/// A stored tuple, read field by field with a cursor.
///
/// Borrowed from the iterator that yielded it; the next advance ends it.
#[derive(Debug, Clone)]
pub struct TupleView<'t> {
    values: &'t [Value],
    cursor: usize,
}

impl<'t> TupleView<'t> {
    pub(crate) fn new(values: &'t [Value]) -> Self {
        TupleView { values, cursor: 0 }
    }

    pub fn read_number(&mut self) -> Result<u32, BridgeError> {
        self.read()
    }

    pub fn read_signed(&mut self) -> Result<i32, BridgeError> {
        self.read()
    }

    /// Read a symbol. The text lives as long as the tuple's storage.
    pub fn read_text(&mut self) -> Result<&'t str, BridgeError> {
        let column = self.cursor;
        let value = self.advance()?;
        value.as_symbol().ok_or(BridgeError::ReadKind {
            column,
            expected: ValueKind::Symbol,
            found: value.kind(),
        })
    }

    /// Read the next field as any supported Rust type.
    pub fn read<T: FromValue>(&mut self) -> Result<T, BridgeError> {
        let column = self.cursor;
        let value = self.advance()?;
        T::from_value(value).ok_or(BridgeError::ReadKind {
            column,
            expected: T::KIND,
            found: value.kind(),
        })
    }

    /// Decode the whole tuple, ignoring the cursor.
    pub fn decode<T: FromTuple>(&self) -> Result<T, BridgeError> {
        Ok(T::from_tuple(self.values)?)
    }

    pub fn values(&self) -> &'t [Value] {
        self.values
    }

    pub fn arity(&self) -> usize {
        self.values.len()
    }

    /// Fields not yet read.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.cursor
    }

    fn advance(&mut self) -> Result<&'t Value, BridgeError> {
        let value = self.values.get(self.cursor).ok_or(BridgeError::ReadPastEnd {
            arity: self.values.len(),
        })?;
        self.cursor += 1;
        Ok(value)
    }
}
