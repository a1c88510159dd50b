//! The set of relations owned by one program instance.

use std::cell::{Ref, RefCell};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::EngineError;
use crate::relation::RelationStorage;
use crate::schema::{RelationDecl, RelationRole};
use crate::value::{FromTuple, Tuple};

/// All relations of a program instance.
///
/// Relations are addressable by name or by their dense declaration index.
/// Each relation lives in its own cell, so a shared borrow of one relation
/// (an open cursor) does not block writes to another.
#[derive(Debug)]
pub struct Database {
    index: FxHashMap<String, usize>,
    decls: Vec<Arc<RelationDecl>>,
    relations: Vec<RefCell<RelationStorage>>,
}

impl Database {
    /// Build empty storage for the given declarations.
    pub fn new(decls: Vec<RelationDecl>) -> Result<Self, EngineError> {
        let mut index = FxHashMap::default();
        let mut shared = Vec::with_capacity(decls.len());
        let mut relations = Vec::with_capacity(decls.len());
        for decl in decls {
            if index.insert(decl.name.clone(), relations.len()).is_some() {
                return Err(EngineError::DuplicateRelation(decl.name));
            }
            let decl = Arc::new(decl);
            relations.push(RefCell::new(RelationStorage::new(Arc::clone(&decl))));
            shared.push(decl);
        }
        Ok(Database {
            index,
            decls: shared,
            relations,
        })
    }

    /// Declaration index of a relation.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Declaration of a relation, by index.
    pub fn decl(&self, idx: usize) -> Option<&RelationDecl> {
        self.decls.get(idx).map(Arc::as_ref)
    }

    /// The cell holding a relation, by declaration index.
    pub fn cell(&self, idx: usize) -> Option<&RefCell<RelationStorage>> {
        self.relations.get(idx)
    }

    /// Shared borrow of a relation by name.
    ///
    /// Panics if the relation is currently borrowed mutably, which cannot
    /// outlive a single call into this crate.
    pub fn relation(&self, name: &str) -> Option<Ref<'_, RelationStorage>> {
        self.position(name).map(|idx| self.relations[idx].borrow())
    }

    /// Exclusive access to a relation by name.
    pub fn relation_mut(&mut self, name: &str) -> Result<&mut RelationStorage, EngineError> {
        let idx = self
            .position(name)
            .ok_or_else(|| EngineError::UnknownRelation(name.to_string()))?;
        Ok(self.relations[idx].get_mut())
    }

    /// Insert one tuple into the named relation.
    pub fn insert(&mut self, name: &str, tuple: Tuple) -> Result<bool, EngineError> {
        self.relation_mut(name)?.insert(tuple)
    }

    /// Decode every tuple of the named relation.
    pub fn decode<T: FromTuple>(&self, name: &str) -> Result<Vec<T>, EngineError> {
        let rel = self
            .relation(name)
            .ok_or_else(|| EngineError::UnknownRelation(name.to_string()))?;
        let decoded = rel.iter().map(|t| T::from_tuple(t)).collect();
        decoded
    }

    /// Replace the contents of the named relation.
    pub fn replace<I>(&mut self, name: &str, tuples: I) -> Result<usize, EngineError>
    where
        I: IntoIterator<Item = Tuple>,
    {
        let rel = self.relation_mut(name)?;
        rel.purge();
        rel.extend(tuples)
    }

    /// Declarations in index order.
    pub fn decls(&self) -> impl Iterator<Item = &RelationDecl> {
        self.decls.iter().map(Arc::as_ref)
    }

    /// Clear every relation whose role matches.
    pub fn purge_where(&mut self, pred: impl Fn(RelationRole) -> bool) -> usize {
        let mut purged = 0;
        for cell in &mut self.relations {
            let rel = cell.get_mut();
            if pred(rel.decl().role) {
                rel.purge();
                purged += 1;
            }
        }
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{IntoTuple, ValueKind};

    fn decls() -> Vec<RelationDecl> {
        vec![
            RelationDecl::new("edge", RelationRole::Input)
                .column("a", ValueKind::Unsigned)
                .column("b", ValueKind::Unsigned),
            RelationDecl::new("node", RelationRole::Internal).column("n", ValueKind::Unsigned),
            RelationDecl::new("path", RelationRole::Output)
                .column("a", ValueKind::Unsigned)
                .column("b", ValueKind::Unsigned),
        ]
    }

    #[test]
    fn test_lookup() {
        let db = Database::new(decls()).unwrap();
        assert_eq!(db.len(), 3);
        assert_eq!(db.position("node"), Some(1));
        assert_eq!(db.decl(1).unwrap().name, "node");
        assert!(db.decl(3).is_none());
        assert!(db.relation("missing").is_none());
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut d = decls();
        d.push(RelationDecl::new("edge", RelationRole::Output));
        assert!(matches!(
            Database::new(d),
            Err(EngineError::DuplicateRelation(name)) if name == "edge"
        ));
    }

    #[test]
    fn test_insert_decode() {
        let mut db = Database::new(decls()).unwrap();
        db.insert("edge", (1u32, 2u32).into_tuple()).unwrap();
        db.insert("edge", (2u32, 3u32).into_tuple()).unwrap();
        let edges: Vec<(u32, u32)> = db.decode("edge").unwrap();
        assert_eq!(edges, vec![(1, 2), (2, 3)]);

        assert!(matches!(
            db.insert("nope", vec![]),
            Err(EngineError::UnknownRelation(_))
        ));
    }

    #[test]
    fn test_purge_where() {
        let mut db = Database::new(decls()).unwrap();
        db.insert("edge", (1u32, 2u32).into_tuple()).unwrap();
        db.insert("path", (1u32, 2u32).into_tuple()).unwrap();

        assert_eq!(db.purge_where(RelationRole::is_input), 1);
        assert!(db.relation("edge").unwrap().is_empty());
        assert_eq!(db.relation("path").unwrap().len(), 1);
    }

    #[test]
    fn test_cells_borrow_independently() {
        let db = Database::new(decls()).unwrap();
        let _reader = db.cell(0).unwrap().borrow();
        let mut writer = db.cell(2).unwrap().borrow_mut();
        writer.insert((5u32, 6u32).into_tuple()).unwrap();
        assert_eq!(writer.len(), 1);
    }
}
