//! Comparison tests: run the same rules through a bare `ascent!` struct and
//! through the program handles, verify both produce identical results.

#![allow(clippy::field_reassign_with_default)]

use std::collections::BTreeSet;

use ascent::aggregators::max;
use ascent::ascent;
use bridge_api::{FromTuple, Program};

fn program(name: &str) -> Program {
    bridge_programs::install();
    Program::create(name).unwrap()
}

/// Extract a relation through an iterator, as a set.
fn handles<T: FromTuple + Ord>(program: &Program, name: &str) -> BTreeSet<T> {
    let relation = program.relation(name).unwrap();
    let mut iter = relation.iter();
    let mut out = BTreeSet::new();
    while let Some(tuple) = iter.next_tuple() {
        assert!(out.insert(tuple.decode().unwrap()), "{name} yielded a tuple twice");
    }
    out
}

// ─── Transitive Closure ─────────────────────────────────────────────

fn closure_edges() -> Vec<(u32, u32)> {
    vec![(1, 2), (2, 3), (3, 1), (3, 4), (5, 6)]
}

#[test]
fn test_transitive_closure_matches_macro() {
    ascent! {
        struct Reference;
        relation edge(u32, u32);
        relation path(u32, u32);
        relation cyclic(u32);
        path(x, y) <-- edge(x, y);
        path(x, z) <-- edge(x, y), path(y, z);
        cyclic(x) <-- path(x, y), if x == y;
    }
    let mut reference = Reference::default();
    reference.edge = closure_edges();
    reference.run();

    let mut program = program("transitive_closure");
    program
        .relation("edge")
        .unwrap()
        .fill(closure_edges(), |t, (a, b)| {
            t.append_number(a).append_number(b);
        })
        .unwrap();
    program.run().unwrap();

    let path: BTreeSet<(u32, u32)> = handles(&program, "path");
    assert_eq!(path, reference.path.iter().copied().collect());
    let cyclic: BTreeSet<(u32,)> = handles(&program, "cyclic");
    assert_eq!(cyclic, reference.cyclic.iter().copied().collect());
}

// ─── Aggregation ────────────────────────────────────────────────────

#[test]
fn test_ranking_matches_macro() {
    let scores = [("ann", 3), ("ann", 9), ("bob", 9), ("cy", -1), ("cy", -7)];

    ascent! {
        struct Reference;
        relation score(String, i32);
        relation best(String, i32);
        best(p, m) <-- score(p, _), agg m = max(s) in score(p, s);
    }
    let mut reference = Reference::default();
    reference.score = scores.iter().map(|&(p, s)| (p.to_string(), s)).collect();
    reference.run();

    let mut program = program("ranking");
    program
        .relation("score")
        .unwrap()
        .fill(scores, |t, (p, s)| {
            t.append_text(p).append_signed(s);
        })
        .unwrap();
    program.run().unwrap();

    let best: BTreeSet<(String, i32)> = handles(&program, "best");
    assert_eq!(best, reference.best.iter().cloned().collect());
    let leader: BTreeSet<(i32,)> = handles(&program, "leader");
    assert_eq!(leader, BTreeSet::from([(9,)]));
}

// ─── Batches ────────────────────────────────────────────────────────

#[test]
fn test_each_batch_matches_fresh_macro_run() {
    ascent! {
        struct Reference;
        relation edge(u32, u32);
        relation path(u32, u32);
        path(x, y) <-- edge(x, y);
        path(x, z) <-- edge(x, y), path(y, z);
    }

    let batches = [vec![(1u32, 2u32), (2, 3)], vec![(7, 8)], vec![]];
    let mut program = program("transitive_closure");
    for batch in batches {
        let mut reference = Reference::default();
        reference.edge = batch.clone();
        reference.run();

        let path = program
            .evaluate(
                |p| {
                    p.relation("edge").unwrap().fill(batch, |t, (a, b)| {
                        t.append_number(a).append_number(b);
                    })?;
                    Ok(())
                },
                "path",
                |t| t.decode::<(u32, u32)>(),
            )
            .unwrap();
        let path: BTreeSet<_> = path.into_iter().collect();
        assert_eq!(path, reference.path.iter().copied().collect());
    }
}
