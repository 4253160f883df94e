// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for completion and lookup with the tree-sitter engine.
//!
//! Run with: `cargo bench --bench analysis`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use snipd::analysis::{AnalysisAdapter, TreeSitterEngine};
use snipd::types::LookupMode;

/// A snippet of `functions` small documented functions followed by a call site.
fn generate_snippet(functions: usize) -> String {
    let mut code = String::from("import math\n\n");
    for i in 0..functions {
        code.push_str(&format!(
            "def helper_{i}(value, factor={i}):\n    \"\"\"Scale value by {i}.\"\"\"\n    result = value * factor\n    return math.sqrt(result)\n\n"
        ));
    }
    code.push_str("class Shape:\n    def __init__(self, w, h):\n        self.w = w\n        self.h = h\n\n    def area(self):\n        return self.w * self.h\n\n");
    code.push_str("shape = Shape(2, 3)\nhel");
    code
}

/// Benchmark synchronous completion at the end of snippets of growing size.
fn bench_complete(c: &mut Criterion) {
    let engine = TreeSitterEngine::new();
    let mut group = c.benchmark_group("analysis_complete");

    for size in [1, 10, 100] {
        let code = generate_snippet(size);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("name_prefix", size), &code, |b, code| {
            b.iter(|| engine.complete_at(black_box(code), code.len()));
        });
    }

    let attribute = "import math\nx = 'text'\nx.st";
    group.bench_function("attribute_str", |b| {
        b.iter(|| engine.complete_at(black_box(attribute), attribute.len()));
    });

    group.finish();
}

/// Benchmark definition lookup.
fn bench_lookup(c: &mut Criterion) {
    let engine = TreeSitterEngine::new();
    let code = generate_snippet(50);
    let call = code.find("helper_42").unwrap() + 3;
    let method = format!("{code}\nshape.area()");
    let area = method.rfind("area").unwrap() + 1;

    let mut group = c.benchmark_group("analysis_lookup");

    group.bench_function("goto_function", |b| {
        b.iter(|| engine.lookup_at(black_box(&code), call, LookupMode::Goto));
    });

    group.bench_function("goto_method", |b| {
        b.iter(|| engine.lookup_at(black_box(&method), area, LookupMode::Goto));
    });

    group.finish();
}

/// Benchmark the adapter path, including task spawn and budget.
fn bench_adapter(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let adapter = AnalysisAdapter::new(Arc::new(TreeSitterEngine::new()), Duration::from_secs(3));
    let code = generate_snippet(10);
    let line = code.lines().count();

    c.bench_function("adapter_complete", |b| {
        b.to_async(&runtime)
            .iter(|| adapter.complete(black_box(&code), line, 3));
    });
}

criterion_group!(benches, bench_complete, bench_lookup, bench_adapter);
criterion_main!(benches);
