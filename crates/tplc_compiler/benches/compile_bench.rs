//! Benchmark harness for the template compiler.
//!
//! Uses criterion for reliable benchmarking.
//! Run with: cargo bench -p tplc_compiler

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tplc_compiler::{compile_file, Program};
use tplc_options::CompilerOptions;

/// A small page with a header.
const PAGE: &str = r#"---
type: page
title: "Counter"
---
$count! = 0
$step: number = 1
$double! = $count * 2

$increment = () => {
    $count = $count + $step
}

class Store {
    constructor(private name: string) {}
    $items! = []
    $add(item) { this.items.push(item) }
}
"#;

fn bench_single_file(c: &mut Criterion) {
    let options = CompilerOptions::default();
    c.bench_function("compile_page", |b| {
        b.iter(|| black_box(compile_file("page.tpl", black_box(PAGE), &options).ok()));
    });
}

fn bench_program(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_program");
    for files in [1usize, 16, 128] {
        let mut program = Program::new(vec![], CompilerOptions::default());
        for i in 0..files {
            program.add_source(format!("page{}.tpl", i), PAGE);
        }
        group.bench_with_input(BenchmarkId::from_parameter(files), &program, |b, program| {
            b.iter(|| black_box(program.compile()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_file, bench_program);
criterion_main!(benches);
