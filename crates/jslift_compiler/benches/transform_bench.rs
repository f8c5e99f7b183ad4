//! Benchmarks for parsing and lifting.
//!
//! Run with: cargo bench -p jslift_compiler

use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jslift_compiler::transform_source;
use jslift_parser::parse_source_file;

const SMALL_SOURCE: &str = r#"
function outer() {
    var x = 1;
    function inner() { return x + 1; }
    return inner();
}
print(outer());
"#;

const NESTED_SOURCE: &str = r#"
function counter(start, step) {
    var total = start;
    function add(n) { total = total + n * step; return total; }
    function twice(n) { return add(n) + add(n); }
    function report(label) {
        function format(v) { return label + ': ' + v; }
        return print(format(twice(step)));
    }
    return report('total');
}
counter(1, 2);
"#;

/// `count` copies of a function with nested helpers.
fn generate_source(count: usize) -> String {
    let mut source = String::new();
    for i in 0..count {
        source.push_str(&format!(
            "function f{i}(a, b) {{\n    var c = a * {i};\n    function g{i}(d) {{ return d + c - b; }}\n    function h{i}() {{ return g{i}(a) << 1; }}\n    return h{i}();\n}}\n"
        ));
    }
    source
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, source) in [("small", SMALL_SOURCE), ("nested", NESTED_SOURCE)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let arena = Bump::new();
                let (sf, _) = parse_source_file(&arena, "bench.js", black_box(source));
                black_box(sf.statements.len());
            })
        });
    }
    group.finish();
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("transform");
    for count in [10, 100, 1000] {
        let source = generate_source(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &source, |b, source| {
            b.iter(|| transform_source("bench.js", black_box(source)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_transform);
criterion_main!(benches);
