// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! All-pairs similarity scoring, serial and parallel.
//!
//! Each worker claims source courses through an atomic counter
//! (work-stealing) and scores that course against its partners. Workers share
//! nothing mutable; their outputs are concatenated and sorted by
//! `(course_a, course_b)`, so the result never depends on worker count or
//! scheduling.
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ident::CourseCode;
use crate::similarity::{SimilarityEngine, SimilarityRecord};

/// Which pairs to evaluate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairMode {
    /// Each unordered pair once, as `(a, b)` with `a < b`.
    #[default]
    Unordered,
    /// Both `(a, b)` and `(b, a)` for every `a != b`.
    Ordered,
}

impl PairMode {
    /// Number of pairs evaluated for `n` courses.
    pub fn pair_count(self, n: usize) -> usize {
        let ordered = n.saturating_mul(n.saturating_sub(1));
        match self {
            Self::Unordered => ordered / 2,
            Self::Ordered => ordered,
        }
    }
}

/// Worker count to use when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
}

fn score_row(
    engine: &SimilarityEngine<'_>,
    codes: &[&CourseCode],
    row: usize,
    mode: PairMode,
    out: &mut Vec<SimilarityRecord>,
) {
    let a = codes[row];
    let partners = match mode {
        PairMode::Unordered => &codes[row + 1..],
        PairMode::Ordered => codes,
    };
    for &b in partners {
        if a != b {
            out.push(engine.score_known(a, b));
        }
    }
}

/// Scores every pair on the calling thread.
pub fn score_all_pairs_serial(
    engine: &SimilarityEngine<'_>,
    mode: PairMode,
) -> Vec<SimilarityRecord> {
    let codes: Vec<&CourseCode> = engine.graph().nodes().collect();
    let mut out = Vec::with_capacity(mode.pair_count(codes.len()));
    for row in 0..codes.len() {
        score_row(engine, &codes, row, mode, &mut out);
    }
    out
}

/// Scores every pair across `workers` scoped threads.
///
/// `workers` is clamped to `1..=course_count`. Output is identical to
/// [`score_all_pairs_serial`].
///
/// # Panics
///
/// Re-raises the panic of any worker thread.
pub fn score_all_pairs(
    engine: &SimilarityEngine<'_>,
    mode: PairMode,
    workers: usize,
) -> Vec<SimilarityRecord> {
    let codes: Vec<&CourseCode> = engine.graph().nodes().collect();
    let workers = workers.clamp(1, codes.len().max(1));
    if workers == 1 {
        return score_all_pairs_serial(engine, mode);
    }

    let next_row = AtomicUsize::new(0);
    let parts: Vec<Vec<SimilarityRecord>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let codes = &codes;
                let next_row = &next_row;
                s.spawn(move || {
                    let mut out = Vec::new();
                    loop {
                        let row = next_row.fetch_add(1, Ordering::Relaxed);
                        if row >= codes.len() {
                            break;
                        }
                        score_row(engine, codes, row, mode, &mut out);
                    }
                    out
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(part) => part,
                Err(e) => std::panic::resume_unwind(e),
            })
            .collect()
    });

    let mut records: Vec<SimilarityRecord> = parts.into_iter().flatten().collect();
    records.sort_by(|x, y| {
        x.course_a
            .cmp(&y.course_a)
            .then_with(|| x.course_b.cmp(&y.course_b))
    });
    debug!(records = records.len(), workers, "scored all pairs");
    records
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::course::Course;
    use crate::depth::compute_depths;
    use crate::graph::CurriculumGraph;
    use crate::similarity::EmbeddingTable;

    fn layered(n: usize) -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        let codes: Vec<CourseCode> = (0..n)
            .map(|i| CourseCode::new(&format!("C{i:03}")).unwrap())
            .collect();
        for c in &codes {
            g.add_course(Course::new(c.clone(), c.as_str()));
        }
        for i in 3..n {
            g.add_edge(&codes[i - 3], &codes[i]).unwrap();
            g.add_edge(&codes[i / 2], &codes[i]).ok();
        }
        g
    }

    #[test]
    fn pair_counts() {
        assert_eq!(PairMode::Unordered.pair_count(4), 6);
        assert_eq!(PairMode::Ordered.pair_count(4), 12);
        assert_eq!(PairMode::Unordered.pair_count(0), 0);
        assert_eq!(PairMode::Ordered.pair_count(1), 0);
    }

    #[test]
    fn serial_output_is_canonically_ordered() {
        let g = layered(6);
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        let recs = score_all_pairs_serial(&engine, PairMode::Unordered);
        assert_eq!(recs.len(), 15);
        assert!(recs.iter().all(|r| r.course_a < r.course_b));
        assert!(recs
            .windows(2)
            .all(|w| (&w[0].course_a, &w[0].course_b) < (&w[1].course_a, &w[1].course_b)));
    }

    #[test]
    fn parallel_matches_serial_for_any_worker_count() {
        let g = layered(23);
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        for mode in [PairMode::Unordered, PairMode::Ordered] {
            let serial = score_all_pairs_serial(&engine, mode);
            assert_eq!(serial.len(), mode.pair_count(23));
            for workers in [0, 1, 2, 3, 8, 64] {
                assert_eq!(score_all_pairs(&engine, mode, workers), serial);
            }
        }
    }

    #[test]
    fn empty_graph_scores_nothing() {
        let g = CurriculumGraph::new();
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        assert!(score_all_pairs(&engine, PairMode::Ordered, 4).is_empty());
    }
}
