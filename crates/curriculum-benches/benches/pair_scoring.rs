// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
// criterion_group!/criterion_main! expand to undocumented functions that cannot
// carry #[allow] (attributes on macro invocations are ignored). Crate-level
// suppress is required for benchmark binaries using Criterion.
#![allow(missing_docs)]
//! All-pairs similarity scoring: serial baseline vs scoped worker threads.
//!
//! # Running
//!
//! ```sh
//! cargo bench --package curriculum-benches --bench pair_scoring
//! ```
//!
//! # What This Measures
//!
//! - `serial_vs_parallel/N`: unordered pair scoring over a layered catalog of N courses
//! - `worker_scaling`: throughput at 1, 2, 4 and 8 workers for a fixed catalog
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use curriculum_core::{
    compute_depths, enforce_acyclic, score_all_pairs, score_all_pairs_serial, CurriculumGraph,
    DepthMap, EmbeddingTable, FoldingNormalizer, GraphBuilder, PairMode, SimilarityEngine,
};
use curriculum_dry_tests::{layered_catalog, HashEmbeddings};
use std::hint::black_box;
use std::time::Duration;

struct Fixture {
    graph: CurriculumGraph,
    depths: DepthMap,
    embeddings: EmbeddingTable,
}

fn fixture(levels: usize, width: usize) -> Option<Fixture> {
    let built = GraphBuilder::new(FoldingNormalizer).build(&layered_catalog(levels, width));
    let graph = enforce_acyclic(built.graph).graph;
    let depths = compute_depths(&graph).ok()?;
    let embeddings = EmbeddingTable::materialize(&HashEmbeddings::new(16), graph.nodes());
    Some(Fixture {
        graph,
        depths,
        embeddings,
    })
}

fn bench_serial_vs_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("serial_vs_parallel");
    group
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(5))
        .sample_size(20);

    for width in [10_usize, 25, 50] {
        let Some(fx) = fixture(6, width) else {
            continue;
        };
        let engine = SimilarityEngine::new(&fx.graph, &fx.depths, &fx.embeddings);
        let n = fx.graph.node_count();
        group.throughput(Throughput::Elements(
            PairMode::Unordered.pair_count(n) as u64
        ));
        group.bench_with_input(BenchmarkId::new("serial", n), &n, |b, _| {
            b.iter(|| black_box(score_all_pairs_serial(&engine, PairMode::Unordered)));
        });
        group.bench_with_input(BenchmarkId::new("parallel_4w", n), &n, |b, _| {
            b.iter(|| black_box(score_all_pairs(&engine, PairMode::Unordered, 4)));
        });
    }
    group.finish();
}

fn bench_worker_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker_scaling");
    group.sample_size(20);
    let Some(fx) = fixture(8, 40) else {
        return;
    };
    let engine = SimilarityEngine::new(&fx.graph, &fx.depths, &fx.embeddings);
    for workers in [1_usize, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &w| {
            b.iter(|| black_box(score_all_pairs(&engine, PairMode::Unordered, w)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_serial_vs_parallel, bench_worker_scaling);
criterion_main!(benches);
