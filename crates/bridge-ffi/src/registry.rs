//! Process-global handle tables.
//!
//! Every operation validates its handles against the tables first. Each
//! handle carries its kind, so a live handle of one kind is never accepted
//! where another is expected. Ids are handed out from monotonic counters and
//! never reused, so a stale handle can always be told apart from a live one.

use std::cell::RefCell;

use bridge_engine::{Engine, ProgramFactory, RelationStorage, Tuple, Value};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::handle::{self, Kind, MAX_ID};

/// Log a contract violation and abort the call by unwinding.
macro_rules! violation {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        tracing::error!(%message, "contract violation");
        panic!("contract violation: {message}")
    }};
}

/// A tuple created for a relation but not inserted yet.
struct PendingTuple {
    program: u32,
    relation: u64,
    values: Tuple,
}

/// Iteration state over one relation.
struct Cursor {
    program: u32,
    relation: u64,
    /// Relation version when the iterator was created.
    version: u64,
    /// Position of the next tuple to yield.
    next: u32,
    /// Position of the tuple being read, if any.
    current: Option<u32>,
    /// Next field of the current tuple.
    field: usize,
}

#[derive(Default)]
pub(crate) struct Registry {
    programs: FxHashMap<u32, Engine>,
    tuples: FxHashMap<u32, PendingTuple>,
    iterators: FxHashMap<u32, Cursor>,
    last_program: u32,
    last_tuple: u32,
    last_iterator: u32,
}

fn next_id(last: &mut u32, kind: Kind) -> u32 {
    if *last >= MAX_ID {
        violation!("{kind} handle space exhausted");
    }
    *last += 1;
    *last
}

/// Check a handle's kind and return its id and slot.
fn resolve(handle: u64, kind: Kind) -> (u32, u32) {
    match handle::unpack(handle) {
        Some((found, id, slot)) if found == kind && id != 0 => (id, slot),
        _ => violation!("{handle:#x} is not a valid {kind} handle"),
    }
}

/// Id of a handle of a kind that leaves the slot empty.
fn id_of(handle: u64, kind: Kind) -> u32 {
    match resolve(handle, kind) {
        (id, 0) => id,
        _ => violation!("{handle:#x} is not a valid {kind} handle"),
    }
}

/// Resolve a relation handle against the live programs.
fn relation_cell(
    programs: &FxHashMap<u32, Engine>,
    relation: u64,
) -> (u32, &RefCell<RelationStorage>) {
    let (program, idx) = resolve(relation, Kind::Relation);
    let Some(engine) = programs.get(&program) else {
        violation!("relation {relation:#x} belongs to a destroyed or unknown program");
    };
    let Some(cell) = engine.database().cell(idx as usize) else {
        violation!("relation {relation:#x} has no index {idx} in program `{}`", engine.name());
    };
    (program, cell)
}

impl Registry {
    // ─── Programs ───────────────────────────────────────────────────────────

    pub(crate) fn create_program(&mut self, name: &str) -> u64 {
        let Some(engine) = ProgramFactory::new_instance(name) else {
            debug!(program = name, "no such program");
            return 0;
        };
        let id = next_id(&mut self.last_program, Kind::Program);
        info!(program = name, handle = id, "program created");
        self.programs.insert(id, engine);
        handle::pack(Kind::Program, id, 0)
    }

    fn engine_mut(&mut self, program: u64) -> &mut Engine {
        let id = id_of(program, Kind::Program);
        match self.programs.get_mut(&id) {
            Some(engine) => engine,
            None => violation!("program {program:#x} is destroyed or unknown"),
        }
    }

    pub(crate) fn run(&mut self, program: u64) {
        let engine = self.engine_mut(program);
        if let Err(err) = engine.run() {
            violation!("program `{}` failed to evaluate: {err}", engine.name());
        }
    }

    pub(crate) fn purge(&mut self, program: u64) {
        self.engine_mut(program).purge();
    }

    pub(crate) fn free_program(&mut self, program: u64) {
        let id = id_of(program, Kind::Program);
        let Some(engine) = self.programs.remove(&id) else {
            violation!("program {program:#x} freed twice or never created");
        };
        self.tuples.retain(|_, t| t.program != id);
        self.iterators.retain(|_, c| c.program != id);
        debug!(program = %engine.name(), handle = id, "program destroyed");
    }

    pub(crate) fn relation(&self, program: u64, name: &str) -> u64 {
        let id = id_of(program, Kind::Program);
        let Some(engine) = self.programs.get(&id) else {
            violation!("program {program:#x} is destroyed or unknown");
        };
        match engine.database().position(name) {
            Some(idx) => handle::pack(Kind::Relation, id, idx as u32),
            None => 0,
        }
    }

    // ─── Relations and write tuples ─────────────────────────────────────────

    pub(crate) fn relation_size(&self, relation: u64) -> u64 {
        relation_cell(&self.programs, relation).1.borrow().len() as u64
    }

    pub(crate) fn create_tuple(&mut self, relation: u64) -> u64 {
        let (program, cell) = relation_cell(&self.programs, relation);
        let arity = cell.borrow().arity();
        let id = next_id(&mut self.last_tuple, Kind::WriteTuple);
        self.tuples.insert(
            id,
            PendingTuple {
                program,
                relation,
                values: Vec::with_capacity(arity),
            },
        );
        handle::pack(Kind::WriteTuple, id, 0)
    }

    pub(crate) fn append(&mut self, tuple: u64, value: Value) {
        let id = id_of(tuple, Kind::WriteTuple);
        let Some(pending) = self.tuples.get_mut(&id) else {
            violation!("tuple {tuple:#x} is inserted, freed or unknown");
        };
        pending.values.push(value);
    }

    pub(crate) fn free_tuple(&mut self, tuple: u64) {
        if self.tuples.remove(&id_of(tuple, Kind::WriteTuple)).is_none() {
            violation!("tuple {tuple:#x} is inserted, freed or unknown");
        }
    }

    pub(crate) fn insert(&mut self, relation: u64, tuple: u64) -> bool {
        let Some(pending) = self.tuples.remove(&id_of(tuple, Kind::WriteTuple)) else {
            violation!("tuple {tuple:#x} is inserted, freed or unknown");
        };
        let (_, cell) = relation_cell(&self.programs, relation);
        if pending.relation != relation {
            violation!(
                "tuple {tuple:#x} was created for relation {:#x}, not {relation:#x}",
                pending.relation
            );
        }
        let mut storage = cell.borrow_mut();
        match storage.insert(pending.values) {
            Ok(added) => added,
            Err(err) => violation!("{err}"),
        }
    }

    // ─── Iterators and read tuples ──────────────────────────────────────────

    pub(crate) fn create_iterator(&mut self, relation: u64) -> u64 {
        let (program, cell) = relation_cell(&self.programs, relation);
        let version = cell.borrow().version();
        let id = next_id(&mut self.last_iterator, Kind::Iterator);
        self.iterators.insert(
            id,
            Cursor {
                program,
                relation,
                version,
                next: 0,
                current: None,
                field: 0,
            },
        );
        handle::pack(Kind::Iterator, id, 0)
    }

    /// Look up an iterator and its relation, checking nothing was modified.
    fn cursor(&mut self, iterator: u32) -> (&mut Cursor, &RefCell<RelationStorage>) {
        let Some(cursor) = self.iterators.get_mut(&iterator) else {
            violation!("iterator {iterator:#x} is freed or unknown");
        };
        let (_, cell) = relation_cell(&self.programs, cursor.relation);
        let version = cell.borrow().version();
        if version != cursor.version {
            violation!(
                "relation `{}` was modified while iterator {iterator:#x} was open",
                cell.borrow().name()
            );
        }
        (cursor, cell)
    }

    pub(crate) fn has_next(&mut self, iterator: u64) -> bool {
        let (cursor, cell) = self.cursor(id_of(iterator, Kind::Iterator));
        (cursor.next as usize) < cell.borrow().len()
    }

    pub(crate) fn next(&mut self, iterator: u64) -> u64 {
        let id = id_of(iterator, Kind::Iterator);
        let (cursor, cell) = self.cursor(id);
        if cursor.next as usize >= cell.borrow().len() {
            violation!("iterator {iterator:#x} advanced past its last tuple");
        }
        let position = cursor.next;
        cursor.current = Some(position);
        cursor.field = 0;
        cursor.next += 1;
        handle::pack(Kind::ReadTuple, id, position)
    }

    pub(crate) fn free_iterator(&mut self, iterator: u64) {
        if self.iterators.remove(&id_of(iterator, Kind::Iterator)).is_none() {
            violation!("iterator {iterator:#x} freed twice or never created");
        }
    }

    /// Read the next field of a tuple yielded by an iterator.
    pub(crate) fn read(&mut self, read: u64) -> Value {
        let (iterator, position) = resolve(read, Kind::ReadTuple);
        let (cursor, cell) = self.cursor(iterator);
        if cursor.current != Some(position) {
            violation!("tuple {read:#x} is no longer the current tuple of its iterator");
        }
        let storage = cell.borrow();
        let Some(tuple) = storage.get(position as usize) else {
            violation!("tuple {read:#x} is out of range");
        };
        let Some(value) = tuple.get(cursor.field) else {
            violation!("read past the last field of a {}-field tuple", tuple.len());
        };
        cursor.field += 1;
        value.clone()
    }

    #[cfg(test)]
    fn live(&self) -> (usize, usize, usize) {
        (self.programs.len(), self.tuples.len(), self.iterators.len())
    }
}
