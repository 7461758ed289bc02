use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use clog::core::types::Field;
use clog::index::Indexer;
use clog::index::field_index::FieldIndex;
use clog::index::value_node::ValueNode;
use rand::Rng;

/// Helper to build a node holding `size` distinct values
fn create_node(size: usize) -> ValueNode {
    let mut node = ValueNode::with_capacity(size + 1, 0);
    for i in 0..size {
        node.find_or_create(format!("value-{:08}", i * 2).as_bytes());
    }
    node
}

/// Helper to build an index of `lines` log lines with a few low-cardinality keys
fn create_index(lines: usize) -> FieldIndex {
    let mut rng = rand::thread_rng();
    let levels = ["debug", "info", "warn", "error"];
    let codes = ["200", "201", "301", "404", "500", "503"];
    let hosts = ["a", "b", "c", "d", "e", "f", "g", "h"];

    let mut index = FieldIndex::new();
    let mut offset = 0;
    for _ in 0..lines {
        let fields = [
            Field::from(("level", levels[rng.gen_range(0..levels.len())])),
            Field::from(("code", codes[rng.gen_range(0..codes.len())])),
            Field::from(("host", hosts[rng.gen_range(0..hosts.len())])),
        ];
        index.index(&fields, offset, 64);
        offset += 64;
    }
    index
}

/// Benchmark inserting a new value in the middle of a node
fn bench_insert_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_node_insert");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let value = format!("value-{:08}", size + 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || create_node(size),
                |mut node| {
                    node.find_or_create(black_box(value.as_bytes()));
                    node
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

/// Benchmark find_or_create on an existing value (no insert)
fn bench_find_or_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_node_find_or_create");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let mut node = create_node(*size);
        let value = format!("value-{:08}", (size - 1) * 2);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                node.find_or_create(black_box(value.as_bytes())).line_count()
            });
        });
    }

    group.finish();
}

/// Benchmark lookup-only binary search
fn bench_binary_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_node_binary_search");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let node = create_node(*size);
        let value = format!("value-{:08}", size / 2 * 2 + 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| node.binary_search(black_box(value.as_bytes())).0);
        });
    }

    group.finish();
}

/// Benchmark single and multi-field queries
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_index_find");

    for lines in [1_000, 10_000, 100_000].iter() {
        let index = create_index(*lines);

        let single = [Field::from(("level", "error"))];
        group.bench_with_input(BenchmarkId::new("single_field", lines), lines, |b, _| {
            b.iter(|| index.find(black_box(&single)).len());
        });

        let multi = [
            Field::from(("level", "error")),
            Field::from(("code", "500")),
            Field::from(("host", "a")),
        ];
        group.bench_with_input(BenchmarkId::new("three_fields", lines), lines, |b, _| {
            b.iter(|| index.find(black_box(&multi)).len());
        });
    }

    group.finish();
}

/// Benchmark indexing throughput
fn bench_index_lines(c: &mut Criterion) {
    c.bench_function("index_10k_lines", |b| {
        b.iter(|| black_box(create_index(10_000)).nodes.len());
    });

    let mut index = FieldIndex::new();
    let mut offset = 0;
    c.bench_function("index_single_line", |b| {
        b.iter(|| {
            let fields = [Field::from(("level", "info")), Field::from(("msg", "ok"))];
            index.index(black_box(&fields), offset, 32);
            offset += 32;
        });
    });
}

criterion_group!(
    benches,
    bench_insert_value,
    bench_find_or_create,
    bench_binary_search,
    bench_find,
    bench_index_lines,
);
criterion_main!(benches);
