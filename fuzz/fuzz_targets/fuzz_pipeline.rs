//! Fuzz the full parse → insert → run → iterate pipeline.
//!
//! Goal: every line that parses must be insertable, and every inserted tuple
//! must come back out of the copy program exactly once.

#![no_main]

use std::collections::BTreeSet;

use bridge_api::{Program, ValueKind};
use datalog_bridge::parse_line;
use libfuzzer_sys::fuzz_target;

const SCHEMA: [ValueKind; 2] = [ValueKind::Unsigned, ValueKind::Symbol];

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    bridge_programs::install();
    let Some(mut program) = Program::create("copy") else {
        return;
    };

    let mut expected = BTreeSet::new();
    let relation = program.relation("in").expect("copy declares `in`");
    for line in input.lines() {
        if let Ok(values) = parse_line(line, '\t', &SCHEMA) {
            let mut tuple = relation.create_tuple();
            for value in values.iter().cloned() {
                tuple.append(value);
            }
            relation.insert(tuple).expect("parsed line must match the schema");
            expected.insert(values);
        }
    }
    program.run().expect("copy cannot fail");

    let output = program.relation("out").expect("copy declares `out`");
    let mut iter = output.iter();
    let mut seen = BTreeSet::new();
    while let Some(tuple) = iter.next_tuple() {
        assert!(seen.insert(tuple.values().to_vec()));
    }
    assert_eq!(seen, expected);
});
