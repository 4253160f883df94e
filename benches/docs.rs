// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Benchmarks for docstring formatting and hover rendering.
//!
//! Run with: `cargo bench --bench docs`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use snipd::docs::{parser, DocFormatter};
use snipd::types::Definition;

const GOOGLE: &str = "Fetch rows from a table.

Retrieves rows pertaining to the given keys.

Args:
    table (Table): An open table handle.
    keys (list[str]): Keys to fetch.
    require_all (bool): Fail when a key is missing.

Returns:
    dict: Mapping of keys to rows.

Raises:
    IOError: An error occurred accessing the table.

Examples:
    Fetch two rows:

    >>> fetch(table, ['a', 'b'])
    {'a': 1, 'b': 2}
";

const REST: &str = "Fetch rows from a table.

:param table: An open table handle.
:type table: Table
:param keys: Keys to fetch.
:type keys: list[str]
:returns: Mapping of keys to rows.
:rtype: dict
:raises IOError: An error occurred accessing the table.
";

const NUMPY: &str = "Fetch rows from a table.

Parameters
----------
table : Table
    An open table handle.
keys : list of str
    Keys to fetch.

Returns
-------
dict
    Mapping of keys to rows.
";

/// Benchmark style detection and parsing per docstring convention.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("docs_parse");

    for (name, doc) in [("google", GOOGLE), ("rest", REST), ("numpy", NUMPY)] {
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::new("parse", name), doc, |b, doc| {
            b.iter(|| parser::parse(black_box(doc)));
        });
    }

    group.finish();
}

/// Benchmark the full hover path for a definition.
fn bench_hover(c: &mut Criterion) {
    let formatter = DocFormatter::new();
    let documented = Definition::new("fetch", "function").with_docstring(Some(GOOGLE.to_string()));
    let plain = Definition::new("total", "statement");
    let long = Definition::new("long", "function").with_docstring(Some(GOOGLE.repeat(20)));

    let mut group = c.benchmark_group("docs_hover");

    group.bench_function("documented", |b| {
        b.iter(|| formatter.hover(black_box(&documented)));
    });

    group.bench_function("undocumented", |b| {
        b.iter(|| formatter.hover(black_box(&plain)));
    });

    group.bench_function("long_docstring", |b| {
        b.iter(|| formatter.hover(black_box(&long)));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_hover);
criterion_main!(benches);
