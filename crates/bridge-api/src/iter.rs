//! Forward iteration over a relation.

use std::cell::Ref;
use std::fmt;

use bridge_engine::RelationStorage;

use crate::tuple::TupleView;

/// Where an iterator stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState {
    /// At least one tuple left.
    Created,
    /// Every tuple has been yielded.
    Exhausted,
}

/// Single-pass cursor over the tuples of one relation.
///
/// Holds a shared borrow of the relation while alive, so the relation cannot
/// be modified until the iterator is dropped. Tuples are yielded in insertion
/// order, each exactly once.
pub struct RelationIter<'p> {
    storage: Ref<'p, RelationStorage>,
    cursor: usize,
}

impl<'p> RelationIter<'p> {
    pub(crate) fn new(storage: Ref<'p, RelationStorage>) -> Self {
        RelationIter { storage, cursor: 0 }
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.storage.len()
    }

    pub fn state(&self) -> IterState {
        if self.has_next() {
            IterState::Created
        } else {
            IterState::Exhausted
        }
    }

    /// Advance and return the next tuple, or `None` once exhausted.
    ///
    /// The view borrows the iterator, so at most one tuple is current.
    pub fn next_tuple(&mut self) -> Option<TupleView<'_>> {
        let idx = self.cursor;
        let tuple = self.storage.get(idx)?;
        self.cursor += 1;
        Some(TupleView::new(tuple))
    }

    /// Tuples not yet yielded.
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.cursor
    }

    pub fn relation_name(&self) -> &str {
        self.storage.name()
    }
}

impl fmt::Debug for RelationIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationIter")
            .field("relation", &self.storage.name())
            .field("cursor", &self.cursor)
            .field("len", &self.storage.len())
            .finish()
    }
}
