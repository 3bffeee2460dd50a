// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored). Crate-level
// suppress is required for benchmark binaries using Criterion.
#![allow(missing_docs)]
//! Catalog-to-graph build and the acyclic/depth stages that follow it.
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use curriculum_core::{compute_depths, enforce_acyclic, FoldingNormalizer, GraphBuilder};
use curriculum_dry_tests::layered_catalog;
use std::hint::black_box;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    for width in [50_usize, 200, 800] {
        let rows = layered_catalog(10, width);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::new("build", rows.len()), &rows, |b, rows| {
            let builder = GraphBuilder::new(FoldingNormalizer);
            b.iter(|| black_box(builder.build(rows)));
        });
        group.bench_with_input(BenchmarkId::new("acyclic_depth", rows.len()), &rows, |b, rows| {
            let graph = GraphBuilder::new(FoldingNormalizer).build(rows).graph;
            b.iter_batched(
                || graph.clone(),
                |g| {
                    let acyclic = enforce_acyclic(g);
                    black_box(compute_depths(&acyclic.graph))
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
