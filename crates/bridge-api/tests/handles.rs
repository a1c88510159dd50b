//! Program, relation, tuple and iterator handles driven end to end.

use std::sync::Once;

use bridge_api::{BridgeError, IterState, Program, RelationRole};
use bridge_engine::{
    Database, Engine, EngineError, Evaluator, FromTuple, ProgramFactory, RelationDecl, ValueKind,
};

// ─── Fixtures ───────────────────────────────────────────────────────────────

/// `P`: copies every `in(id, label)` into `out(id, label)`.
struct Passthrough;

impl Evaluator for Passthrough {
    fn declarations(&self) -> Vec<RelationDecl> {
        vec![
            RelationDecl::new("in", RelationRole::Input)
                .column("id", ValueKind::Unsigned)
                .column("label", ValueKind::Symbol),
            RelationDecl::new("out", RelationRole::Output)
                .column("id", ValueKind::Unsigned)
                .column("label", ValueKind::Symbol),
        ]
    }

    fn evaluate(&mut self, db: &mut Database) -> Result<(), EngineError> {
        let rows: Vec<(u32, String)> = db.decode("in")?;
        db.replace("out", rows.into_iter().map(bridge_engine::IntoTuple::into_tuple))?;
        Ok(())
    }
}

static REGISTER: Once = Once::new();

fn program() -> Program {
    REGISTER.call_once(|| {
        ProgramFactory::register("P", || Box::new(Passthrough));
    });
    Program::create("P").unwrap()
}

fn rows<T: FromTuple>(program: &Program, relation: &str) -> Vec<T> {
    program.relation(relation).unwrap().decode().unwrap()
}

// ─── Lifecycle ──────────────────────────────────────────────────────────────

#[test]
fn test_insert_run_iterate() {
    let mut program = program();
    {
        let input = program.relation("in").unwrap();
        let mut tuple = input.create_tuple();
        tuple.append_number(7).append_text("alpha");
        assert!(input.insert(tuple).unwrap());
    }
    program.run().unwrap();

    let output = program.relation("out").unwrap();
    let mut iter = output.iter();
    assert!(iter.has_next());
    let mut tuple = iter.next_tuple().unwrap();
    assert_eq!(tuple.read_number().unwrap(), 7);
    assert_eq!(tuple.read_text().unwrap(), "alpha");
    assert!(!iter.has_next());
    assert!(iter.next_tuple().is_none());
    assert_eq!(iter.state(), IterState::Exhausted);
}

#[test]
fn test_program_from_engine() {
    let engine = Engine::new("standalone", Box::new(Passthrough)).unwrap();
    let mut program = Program::from_engine(engine);
    assert_eq!(program.name(), "standalone");
    program
        .relation("in")
        .unwrap()
        .fill([(1u32, "ünïcødé"), (2, "日本語 🦀")], |t, (id, label)| {
            t.append_number(id).append_text(label);
        })
        .unwrap();
    program.run().unwrap();

    let output = program.relation("out").unwrap();
    let mut iter = output.iter();
    assert_eq!(iter.relation_name(), "out");
    let mut labels = Vec::new();
    while let Some(mut tuple) = iter.next_tuple() {
        tuple.read_number().unwrap();
        labels.push(tuple.read_text().unwrap().to_string());
    }
    assert_eq!(labels, ["ünïcødé", "日本語 🦀"]);
}

#[test]
fn test_unknown_names() {
    assert!(Program::create("no_such_program").is_none());
    let program = program();
    assert!(program.relation("nope").is_none());
}

#[test]
fn test_relations_in_declaration_order() {
    let program = program();
    let names: Vec<&str> = program.relations().map(|r| r.name()).collect();
    assert_eq!(names, ["in", "out"]);
    let roles: Vec<RelationRole> = program.relations().map(|r| r.declaration().role).collect();
    assert_eq!(roles, [RelationRole::Input, RelationRole::Output]);
}

#[test]
fn test_empty_relation_iterator() {
    let program = program();
    let out = program.relation("out").unwrap();
    assert!(out.is_empty());
    let mut iter = out.iter();
    assert!(!iter.has_next());
    assert_eq!(iter.state(), IterState::Exhausted);
    assert!(iter.next_tuple().is_none());
}

#[test]
fn test_purge_clears_every_relation() {
    let mut program = program();
    let input = program.relation("in").unwrap();
    input
        .fill([(1u32, "a"), (2, "b")], |t, (id, label)| {
            t.append_number(id).append_text(label);
        })
        .unwrap();
    program.run().unwrap();
    assert_eq!(program.relation("out").unwrap().len(), 2);

    program.purge();
    for relation in program.relations() {
        assert!(!relation.iter().has_next(), "{} not purged", relation.name());
    }
}

#[test]
fn test_duplicate_insert() {
    let program = program();
    let input = program.relation("in").unwrap();
    for expected in [true, false] {
        let mut tuple = input.create_tuple();
        tuple.append_number(3).append_text("x");
        assert_eq!(input.insert(tuple).unwrap(), expected);
    }
    assert_eq!(input.len(), 1);
}

#[test]
fn test_iteration_order_is_insertion_order() {
    let program = program();
    let input = program.relation("in").unwrap();
    input
        .fill([9u32, 2, 5], |t, id| {
            t.append_number(id).append_text("n");
        })
        .unwrap();

    let mut seen = Vec::new();
    let mut iter = input.iter();
    while let Some(mut tuple) = iter.next_tuple() {
        seen.push(tuple.read_number().unwrap());
    }
    assert_eq!(seen, [9, 2, 5]);
}

// ─── Misuse ─────────────────────────────────────────────────────────────────

#[test]
fn test_insert_while_iterating_is_rejected() {
    let program = program();
    let input = program.relation("in").unwrap();
    let mut tuple = input.create_tuple();
    tuple.append_number(1).append_text("a");
    input.insert(tuple).unwrap();

    let iter = input.iter();
    let mut tuple = input.create_tuple();
    tuple.append_number(2).append_text("b");
    let err = input.insert(tuple).unwrap_err();
    assert!(matches!(err, BridgeError::RelationBusy { ref relation } if relation == "in"));
    assert_eq!(input.len(), 1);

    drop(iter);
    let mut tuple = input.create_tuple();
    tuple.append_number(2).append_text("b");
    assert!(input.insert(tuple).unwrap());
}

#[test]
fn test_tuple_from_other_relation_is_rejected() {
    let program = program();
    let input = program.relation("in").unwrap();
    let output = program.relation("out").unwrap();
    let mut tuple = input.create_tuple();
    tuple.append_number(1).append_text("a");

    let err = output.insert(tuple).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::ForeignTuple { ref created_for, ref inserted_into }
            if created_for == "in" && inserted_into == "out"
    ));
    assert!(output.is_empty());
}

#[test]
fn test_schema_mismatch_is_rejected() {
    let program = program();
    let input = program.relation("in").unwrap();

    let mut short = input.create_tuple();
    short.append_number(1);
    assert!(matches!(
        input.insert(short),
        Err(BridgeError::Engine(EngineError::Arity { expected: 2, found: 1, .. }))
    ));

    let mut swapped = input.create_tuple();
    swapped.append_text("a").append_number(1);
    assert!(matches!(
        input.insert(swapped),
        Err(BridgeError::Engine(EngineError::Schema { column: 0, .. }))
    ));
    assert!(input.is_empty());
}

#[test]
fn test_read_errors() {
    let program = program();
    let input = program.relation("in").unwrap();
    let mut tuple = input.create_tuple();
    tuple.append_number(4).append_text("z");
    input.insert(tuple).unwrap();

    let mut iter = input.iter();
    let mut view = iter.next_tuple().unwrap();
    assert!(matches!(view.read_text(), Err(BridgeError::ReadKind { column: 0, .. })));
    view.read_text().unwrap();
    assert!(matches!(view.read_number(), Err(BridgeError::ReadPastEnd { arity: 2 })));
}

// ─── Batches ────────────────────────────────────────────────────────────────

#[test]
fn test_evaluate_reuses_instance() {
    let mut program = program();
    let batches = [vec![(1u32, "one"), (2, "two")], vec![(3u32, "three")]];
    let mut results = Vec::new();
    for batch in batches {
        let out = program
            .evaluate(
                |p| {
                    p.relation("in").unwrap().fill(batch, |t, (id, label)| {
                        t.append_number(id).append_text(label);
                    })?;
                    Ok(())
                },
                "out",
                |mut t| Ok((t.read_number()?, t.read_text()?.to_string())),
            )
            .unwrap();
        results.push(out);
    }

    assert_eq!(results[0], [(1, "one".to_string()), (2, "two".to_string())]);
    assert_eq!(results[1], [(3, "three".to_string())]);
    assert!(program.relation("in").unwrap().is_empty());
    assert!(program.relation("out").unwrap().is_empty());
}

#[test]
fn test_evaluate_purges_on_failure() {
    let mut program = program();
    let err = program
        .evaluate(
            |p| {
                let input = p.relation("in").unwrap();
                let mut tuple = input.create_tuple();
                tuple.append_number(1).append_text("a");
                input.insert(tuple)?;
                Ok(())
            },
            "missing",
            |t| Ok(t.arity()),
        )
        .unwrap_err();
    assert!(matches!(err, BridgeError::Engine(EngineError::UnknownRelation(_))));
    assert!(program.relation("in").unwrap().is_empty());
}

#[test]
fn test_compiled_program_through_handles() {
    bridge_programs::install();
    let mut program = Program::create("transitive_closure").unwrap();
    let edges = program.relation("edge").unwrap();
    edges
        .fill([(1u32, 2u32), (2, 3)], |t, (a, b)| {
            t.append_number(a).append_number(b);
        })
        .unwrap();
    program.run().unwrap();

    let mut path: Vec<(u32, u32)> = rows(&program, "path");
    path.sort();
    assert_eq!(path, [(1, 2), (1, 3), (2, 3)]);
}
