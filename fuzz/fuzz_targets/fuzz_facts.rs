//! Fuzz the fact-line parser with arbitrary strings.
//!
//! Goal: find panics in field splitting or number parsing.
//! The parser should either return Ok or Err, never panic.

#![no_main]

use bridge_api::ValueKind;
use datalog_bridge::parse_line;
use libfuzzer_sys::fuzz_target;

const SCHEMAS: [&[ValueKind]; 3] = [
    &[ValueKind::Unsigned, ValueKind::Symbol],
    &[ValueKind::Signed, ValueKind::Signed, ValueKind::Unsigned],
    &[ValueKind::Symbol],
];

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        for schema in SCHEMAS {
            for delimiter in ['\t', ','] {
                if let Ok(values) = parse_line(input, delimiter, schema) {
                    assert_eq!(values.len(), schema.len());
                }
            }
        }
    }
});
