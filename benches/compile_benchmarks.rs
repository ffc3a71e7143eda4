//! Performance benchmarks for the QScript parse + compile pipeline.
//!
//! - Script-based: the programs under `test_scripts/`
//! - Generated: large synthetic programs to measure throughput
//!
//! Run with the `profiling` feature to forward scopes to a profiler:
//!
//! ```bash
//! cargo bench --features profiling
//! ```

use bumpalo::Bump;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use qscript::{Compiler, Engine, NameTable, Parser};
use std::fmt::Write;
use std::hint::black_box;

/// A program with `count` functions that each hit loops, switches and try
/// statements.
fn generate_program(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        let _ = write!(
            source,
            r#"
function work{i}(items, limit) {{
    var total = 0;
    for (var j = 0; j < items.length; j++) {{
        if (items[j] > limit) continue;
        switch (items[j] % 3) {{
        case 0: total += items[j]; break;
        case 1: total -= 1;
        default: total *= 2;
        }}
    }}
    try {{
        for (var key in items) {{
            if (key == "stop") return total;
        }}
    }} catch (e) {{
        total = -1;
    }} finally {{
        items = null;
    }}
    return total || limit;
}}
"#
        );
    }
    source
}

/// Benchmark the full pipeline on the bundled test scripts.
fn script_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/scripts");

    let scripts = [
        ("control_flow", include_str!("../test_scripts/control_flow.js")),
        ("exceptions", include_str!("../test_scripts/exceptions.js")),
        ("closures", include_str!("../test_scripts/closures.js")),
        ("operators", include_str!("../test_scripts/operators.js")),
    ];

    for (name, source) in scripts {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut engine = Engine::new();
                let unit = engine.compile(black_box(source)).unwrap();
                black_box(unit.len())
            });
        });
    }

    group.finish();
}

/// Benchmark parsing and compiling separately on generated programs.
fn size_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/size");

    for count in [10, 100, 500] {
        let source = generate_program(count);
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_function(format!("parse_{count}_functions"), |b| {
            b.iter(|| {
                let arena = Bump::new();
                let program = Parser::parse_program(black_box(&source), &arena).unwrap();
                black_box(program.body.len())
            });
        });

        let arena = Bump::new();
        let program = Parser::parse_program(&source, &arena).unwrap();
        group.bench_function(format!("compile_{count}_functions"), |b| {
            b.iter(|| {
                let mut names = NameTable::new();
                let unit = Compiler::new(&mut names).compile_program(black_box(&program));
                black_box(unit.functions().len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, script_benchmarks, size_benchmarks);
criterion_main!(benches);
