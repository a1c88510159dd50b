//! Borrowed relation handles.

use std::cell::RefCell;
use std::fmt;
use std::ptr;

use bridge_engine::{Database, FromTuple, RelationDecl, RelationStorage, Tuple};
use tracing::trace;

use crate::error::BridgeError;
use crate::iter::RelationIter;
use crate::tuple::WriteTuple;

/// A relation inside a [`Program`](crate::Program).
///
/// Cheap to copy. Borrows the program, so it cannot outlive it or survive a
/// `run`, `purge` or `destroy`.
#[derive(Clone, Copy)]
pub struct Relation<'p> {
    decl: &'p RelationDecl,
    cell: &'p RefCell<RelationStorage>,
}

impl<'p> Relation<'p> {
    pub(crate) fn at(db: &'p Database, idx: usize) -> Option<Self> {
        Some(Relation {
            decl: db.decl(idx)?,
            cell: db.cell(idx)?,
        })
    }

    pub fn name(&self) -> &'p str {
        &self.decl.name
    }

    /// Declared name, role and columns.
    pub fn declaration(&self) -> &'p RelationDecl {
        self.decl
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }

    /// Number of tuples. Always readable, even while iterating.
    pub fn len(&self) -> usize {
        self.cell.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty tuple bound to this relation.
    pub fn create_tuple(&self) -> WriteTuple<'p> {
        WriteTuple::new(*self)
    }

    /// Insert a tuple created by [`create_tuple`](Self::create_tuple).
    ///
    /// Returns false if an equal tuple was already present. Fails if the tuple
    /// belongs to another relation, does not match the schema, or an iterator
    /// over this relation is still open.
    pub fn insert(&self, tuple: WriteTuple<'p>) -> Result<bool, BridgeError> {
        let owner = tuple.relation();
        if !ptr::eq(owner.cell, self.cell) {
            return Err(BridgeError::ForeignTuple {
                created_for: owner.name().to_string(),
                inserted_into: self.name().to_string(),
            });
        }
        self.insert_values(tuple.into_values())
    }

    /// Encode every element with `encode` and insert it.
    ///
    /// Returns the number of tuples that were new.
    pub fn fill<I, F>(&self, elements: I, mut encode: F) -> Result<usize, BridgeError>
    where
        I: IntoIterator,
        F: FnMut(&mut WriteTuple<'p>, I::Item),
    {
        let mut added = 0;
        for element in elements {
            let mut tuple = self.create_tuple();
            encode(&mut tuple, element);
            if self.insert(tuple)? {
                added += 1;
            }
        }
        trace!(relation = self.name(), added, "relation filled");
        Ok(added)
    }

    /// A fresh iterator positioned before the first tuple.
    pub fn iter(&self) -> RelationIter<'p> {
        RelationIter::new(self.cell.borrow())
    }

    /// Decode every tuple into a Rust tuple, in iteration order.
    pub fn decode<T: FromTuple>(&self) -> Result<Vec<T>, BridgeError> {
        let storage = self.cell.borrow();
        let decoded = storage
            .iter()
            .map(|tuple| T::from_tuple(tuple))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decoded)
    }

    fn insert_values(&self, values: Tuple) -> Result<bool, BridgeError> {
        let mut storage = self.cell.try_borrow_mut().map_err(|_| BridgeError::RelationBusy {
            relation: self.name().to_string(),
        })?;
        Ok(storage.insert(values)?)
    }
}

impl fmt::Debug for Relation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("decl", &format_args!("{}", self.decl))
            .field("len", &self.cell.try_borrow().map(|s| s.len()).ok())
            .finish()
    }
}
