// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-K neighbour ranking.
//!
//! Order is total: `score_combined` descending, then neighbour code
//! ascending. When a neighbour appears in more than one record (ordered pair
//! mode yields both `(a, b)` and `(b, a)`), its best score is used once.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ident::CourseCode;
use crate::similarity::SimilarityRecord;

/// One row of the ranking table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// The target course.
    pub course: CourseCode,
    /// A course similar to the target.
    pub similar_course: CourseCode,
    /// Combined similarity score.
    pub score: f64,
}

fn by_rank(a: &(&CourseCode, f64), b: &(&CourseCode, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

fn best_by_neighbour<'r>(
    target: &CourseCode,
    records: impl IntoIterator<Item = &'r SimilarityRecord>,
) -> BTreeMap<&'r CourseCode, f64> {
    let mut best: BTreeMap<&CourseCode, f64> = BTreeMap::new();
    for rec in records {
        let other = if rec.course_a == *target {
            &rec.course_b
        } else if rec.course_b == *target {
            &rec.course_a
        } else {
            continue;
        };
        if other == target {
            continue;
        }
        best.entry(other)
            .and_modify(|s| *s = s.max(rec.score_combined))
            .or_insert(rec.score_combined);
    }
    best
}

fn take_top(target: &CourseCode, best: BTreeMap<&CourseCode, f64>, k: usize) -> Vec<Ranking> {
    let mut ranked: Vec<(&CourseCode, f64)> = best.into_iter().collect();
    ranked.sort_by(by_rank);
    ranked
        .into_iter()
        .take(k)
        .map(|(other, score)| Ranking {
            course: target.clone(),
            similar_course: other.clone(),
            score,
        })
        .collect()
}

/// Top `k` neighbours of `target` among `records`.
///
/// Records that do not involve `target` are ignored. Returns
/// `min(k, distinct neighbours)` rows.
pub fn top_k(target: &CourseCode, records: &[SimilarityRecord], k: usize) -> Vec<Ranking> {
    if k == 0 {
        return Vec::new();
    }
    take_top(target, best_by_neighbour(target, records), k)
}

/// Top `k` table for every course appearing in `records`, grouped by course
/// in ascending order.
pub fn rank_all(records: &[SimilarityRecord], k: usize) -> Vec<Ranking> {
    if k == 0 {
        return Vec::new();
    }
    let mut touching: BTreeMap<&CourseCode, Vec<&SimilarityRecord>> = BTreeMap::new();
    for rec in records {
        touching.entry(&rec.course_a).or_default().push(rec);
        touching.entry(&rec.course_b).or_default().push(rec);
    }
    touching
        .into_iter()
        .flat_map(|(target, recs)| take_top(target, best_by_neighbour(target, recs), k))
        .collect()
}
