//! Tuple storage for a single relation.
//!
//! Tuples are kept in insertion order with a hash set for deduplication, so
//! iteration order is stable between mutations and a position is a valid
//! cursor.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::error::EngineError;
use crate::schema::RelationDecl;
use crate::value::{Tuple, Value};

/// Storage for a single relation.
#[derive(Debug, Clone)]
pub struct RelationStorage {
    decl: Arc<RelationDecl>,
    /// All tuples in the relation, stored as a Vec for index-based access.
    tuples: Vec<Tuple>,
    /// Deduplication set.
    seen: FxHashSet<Tuple>,
    /// Bumped on every mutation. Cursors compare against it.
    version: u64,
}

impl RelationStorage {
    /// Create an empty relation for the given declaration.
    pub fn new(decl: impl Into<Arc<RelationDecl>>) -> Self {
        Self {
            decl: decl.into(),
            tuples: Vec::new(),
            seen: FxHashSet::default(),
            version: 0,
        }
    }

    pub fn decl(&self) -> &RelationDecl {
        &self.decl
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn arity(&self) -> usize {
        self.decl.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check a tuple against the declared schema without inserting it.
    pub fn check(&self, tuple: &[Value]) -> Result<(), EngineError> {
        if tuple.len() != self.arity() {
            return Err(EngineError::Arity {
                relation: self.decl.name.clone(),
                expected: self.arity(),
                found: tuple.len(),
            });
        }
        for (column, (value, expected)) in tuple.iter().zip(self.decl.kinds()).enumerate() {
            if value.kind() != expected {
                return Err(EngineError::Schema {
                    relation: self.decl.name.clone(),
                    column,
                    expected,
                    found: value.kind(),
                });
            }
        }
        Ok(())
    }

    /// Insert a tuple. Returns true if it was not already present.
    pub fn insert(&mut self, tuple: Tuple) -> Result<bool, EngineError> {
        self.check(&tuple)?;
        if self.seen.insert(tuple.clone()) {
            self.tuples.push(tuple);
            self.version += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Insert every tuple, stopping at the first schema violation.
    pub fn extend<I>(&mut self, tuples: I) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = Tuple>,
    {
        let mut added = 0;
        for tuple in tuples {
            if self.insert(tuple)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Check if a tuple exists.
    pub fn contains(&self, tuple: &[Value]) -> bool {
        self.seen.contains(tuple)
    }

    /// Iterate over all tuples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter()
    }

    /// Get a tuple by position.
    pub fn get(&self, idx: usize) -> Option<&Tuple> {
        self.tuples.get(idx)
    }

    /// Remove every tuple. Always counts as a mutation.
    pub fn purge(&mut self) {
        self.tuples.clear();
        self.seen.clear();
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RelationRole;
    use crate::value::{IntoTuple, ValueKind};

    fn pairs() -> RelationStorage {
        RelationStorage::new(
            RelationDecl::new("in", RelationRole::Input)
                .column("n", ValueKind::Unsigned)
                .column("s", ValueKind::Symbol),
        )
    }

    #[test]
    fn test_insert_and_contains() {
        let mut rel = pairs();
        let tuple = (1u32, "a").into_tuple();

        assert!(rel.insert(tuple.clone()).unwrap());
        assert!(!rel.insert(tuple.clone()).unwrap()); // duplicate
        assert!(rel.contains(&tuple));
        assert_eq!(rel.len(), 1);
    }

    #[test]
    fn test_insertion_order() {
        let mut rel = pairs();
        rel.insert((3u32, "c").into_tuple()).unwrap();
        rel.insert((1u32, "a").into_tuple()).unwrap();
        rel.insert((2u32, "b").into_tuple()).unwrap();

        let firsts: Vec<_> = rel.iter().map(|t| t[0].clone()).collect();
        assert_eq!(firsts, vec![Value::Unsigned(3), Value::Unsigned(1), Value::Unsigned(2)]);
        assert_eq!(rel.get(1), Some(&(1u32, "a").into_tuple()));
        assert_eq!(rel.get(3), None);
    }

    #[test]
    fn test_schema_rejected() {
        let mut rel = pairs();
        assert!(matches!(
            rel.insert(vec![Value::Unsigned(1)]),
            Err(EngineError::Arity { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            rel.insert(("a", 1u32).into_tuple()),
            Err(EngineError::Schema { column: 0, .. })
        ));
        assert!(rel.is_empty());
        assert_eq!(rel.version(), 0);
    }

    #[test]
    fn test_version_tracks_mutation() {
        let mut rel = pairs();
        rel.insert((1u32, "a").into_tuple()).unwrap();
        let v = rel.version();

        // Duplicate is not a mutation.
        rel.insert((1u32, "a").into_tuple()).unwrap();
        assert_eq!(rel.version(), v);

        rel.purge();
        assert!(rel.version() > v);
        assert!(rel.is_empty());

        // Purging an empty relation still counts.
        let v = rel.version();
        rel.purge();
        assert!(rel.version() > v);
    }
}
