//! Performance benchmarks: program handles vs a bare ascent struct.
//!
//! Run with: cargo bench

#![allow(clippy::field_reassign_with_default)]

use ascent::ascent;
use bridge_api::Program;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

fn chain(n: u32) -> impl Iterator<Item = (u32, u32)> {
    (1..n).map(|i| (i, i + 1))
}

fn program() -> Program {
    bridge_programs::install();
    Program::create("transitive_closure").unwrap()
}

// ─── Transitive Closure ─────────────────────────────────────────────

fn bench_transitive_closure(c: &mut Criterion) {
    let mut group = c.benchmark_group("transitive_closure");

    for &n in &[50, 100, 200] {
        group.bench_with_input(BenchmarkId::new("handles", n), &n, |b, &n| {
            let mut program = program();
            b.iter(|| {
                program
                    .evaluate(
                        |p| {
                            p.relation("edge").unwrap().fill(chain(n), |t, (from, to)| {
                                t.append_number(from).append_number(to);
                            })?;
                            Ok(())
                        },
                        "path",
                        |mut t| Ok((t.read_number()?, t.read_number()?)),
                    )
                    .unwrap()
            });
        });

        group.bench_with_input(BenchmarkId::new("ascent_macro", n), &n, |b, &n| {
            b.iter(|| {
                ascent! {
                    struct Closure;
                    relation edge(u32, u32);
                    relation path(u32, u32);
                    path(x, y) <-- edge(x, y);
                    path(x, z) <-- edge(x, y), path(y, z);
                }
                let mut prog = Closure::default();
                prog.edge = chain(n).collect();
                prog.run();
                prog.path.len()
            });
        });
    }
    group.finish();
}

// ─── Handle overhead ────────────────────────────────────────────────

fn bench_insert_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_iterate");

    for &n in &[1_000u32, 10_000] {
        group.bench_with_input(BenchmarkId::new("copy", n), &n, |b, &n| {
            bridge_programs::install();
            let mut program = Program::create("copy").unwrap();
            let labels: Vec<String> = (0..n).map(|i| format!("label{i}")).collect();
            b.iter(|| {
                let input = program.relation("in").unwrap();
                input
                    .fill(labels.iter().enumerate(), |t, (i, label)| {
                        t.append_number(i as u32).append_text(label);
                    })
                    .unwrap();
                program.run().unwrap();

                let mut total = 0usize;
                let output = program.relation("out").unwrap();
                let mut iter = output.iter();
                while let Some(mut tuple) = iter.next_tuple() {
                    total += tuple.read_number().unwrap() as usize;
                    total += tuple.read_text().unwrap().len();
                }
                drop(iter);
                program.purge();
                total
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transitive_closure, bench_insert_iterate);
criterion_main!(benches);
