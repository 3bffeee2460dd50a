// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pairwise course similarity.
//!
//! Four independent signals, each in `[0, 1]`:
//!
//! | signal | definition |
//! |---|---|
//! | `jaccard_pred` | Jaccard index of the two predecessor sets |
//! | `jaccard_succ` | Jaccard index of the two successor sets |
//! | `depth_similarity` | `1 - |depth(a) - depth(b)| / max_depth` (1 when `max_depth == 0`) |
//! | `vector_similarity` | cosine of the two embeddings, negatives clamped to 0 |
//!
//! The combined score is the weighted mean of the signals over the weights
//! that are non-zero. A signal whose input is missing (no depth, no usable
//! embedding) is scored 0 and named in [`SimilarityRecord::fallbacks`], so a
//! low score can always be told apart from missing data.
//!
//! # Empty Jaccard
//!
//! When both sets are empty the index is `0/0`. [`EmptyJaccard::Zero`] (the
//! default) scores it 0, [`EmptyJaccard::One`] scores it 1. Two courses with
//! no prerequisites are not evidence of equivalence, hence the default.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::depth::DepthMap;
use crate::graph::CurriculumGraph;
use crate::ident::CourseCode;

/// Supplies an embedding vector per course.
///
/// Implemented by [`EmbeddingTable`] and by any
/// `Fn(&CourseCode) -> Option<Vec<f32>>`.
pub trait EmbeddingProvider {
    /// The embedding for `code`, or `None` if none is available.
    fn embedding(&self, code: &CourseCode) -> Option<Vec<f32>>;
}

impl<F> EmbeddingProvider for F
where
    F: Fn(&CourseCode) -> Option<Vec<f32>>,
{
    fn embedding(&self, code: &CourseCode) -> Option<Vec<f32>> {
        self(code)
    }
}

/// Error returned when inserting into an [`EmbeddingTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// The vector's length differs from the table's dimension.
    #[error("embedding for {code} has dimension {found}, table dimension is {expected}")]
    DimensionMismatch {
        /// Course the vector belongs to.
        code: CourseCode,
        /// Table dimension (set by the first vector).
        expected: usize,
        /// Length of the rejected vector.
        found: usize,
    },
    /// The vector is empty or contains a non-finite value.
    #[error("embedding for {0} is empty or not finite")]
    Invalid(CourseCode),
}

/// Fully materialised embeddings, fixed dimension.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmbeddingTable {
    vectors: BTreeMap<CourseCode, Vec<f32>>,
    dimension: Option<usize>,
}

impl EmbeddingTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls the embedding of every code from `provider`.
    ///
    /// Vectors that cannot be inserted (wrong dimension, empty, non-finite)
    /// are left out; scoring then treats the course as having no embedding.
    pub fn materialize<'c, P>(provider: &P, codes: impl IntoIterator<Item = &'c CourseCode>) -> Self
    where
        P: EmbeddingProvider + ?Sized,
    {
        let mut table = Self::new();
        for code in codes {
            if let Some(vector) = provider.embedding(code) {
                if let Err(err) = table.insert(code.clone(), vector) {
                    warn!(%err, "dropping embedding");
                }
            }
        }
        table
    }

    /// Builds a table from a code-to-vector map, rejecting the first invalid entry.
    pub fn from_map(map: BTreeMap<CourseCode, Vec<f32>>) -> Result<Self, EmbeddingError> {
        let mut table = Self::new();
        for (code, vector) in map {
            table.insert(code, vector)?;
        }
        Ok(table)
    }

    /// Inserts or replaces the embedding for `code`.
    pub fn insert(&mut self, code: CourseCode, vector: Vec<f32>) -> Result<(), EmbeddingError> {
        if vector.is_empty() || vector.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::Invalid(code));
        }
        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(EmbeddingError::DimensionMismatch {
                    code,
                    expected,
                    found: vector.len(),
                })
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }
        self.vectors.insert(code, vector);
        Ok(())
    }

    /// The embedding for `code`.
    pub fn get(&self, code: &CourseCode) -> Option<&[f32]> {
        self.vectors.get(code).map(Vec::as_slice)
    }

    /// Vector dimension, once at least one vector is stored.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl EmbeddingProvider for EmbeddingTable {
    fn embedding(&self, code: &CourseCode) -> Option<Vec<f32>> {
        self.get(code).map(<[f32]>::to_vec)
    }
}

/// Convention for the Jaccard index of two empty sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyJaccard {
    /// `J(∅, ∅) = 0`.
    #[default]
    Zero,
    /// `J(∅, ∅) = 1`.
    One,
}

/// Jaccard index `|a ∩ b| / |a ∪ b|`.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>, empty: EmptyJaccard) -> f64 {
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    if union == 0 {
        return match empty {
            EmptyJaccard::Zero => 0.0,
            EmptyJaccard::One => 1.0,
        };
    }
    inter as f64 / union as f64
}

/// Depth proximity, `None` when either depth is unknown.
pub fn depth_similarity(a: Option<u32>, b: Option<u32>, max_depth: u32) -> Option<f64> {
    let (a, b) = (a?, b?);
    if max_depth == 0 {
        return Some(1.0);
    }
    Some((1.0 - f64::from(a.abs_diff(b)) / f64::from(max_depth)).clamp(0.0, 1.0))
}

/// Raw cosine similarity in `[-1, 1]`.
///
/// `None` when the lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (dot, na, nb) = a.iter().zip(b).fold((0.0_f64, 0.0_f64, 0.0_f64), |(d, x, y), (&p, &q)| {
        let (p, q) = (f64::from(p), f64::from(q));
        (d + p * q, x + p * p, y + q * q)
    });
    let norm = na.sqrt() * nb.sqrt();
    if norm == 0.0 {
        return None;
    }
    Some((dot / norm).clamp(-1.0, 1.0))
}

/// One of the four similarity signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Predecessor-set Jaccard.
    JaccardPred,
    /// Successor-set Jaccard.
    JaccardSucc,
    /// Depth proximity.
    Depth,
    /// Embedding cosine.
    Vector,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JaccardPred => "jaccard_pred",
            Self::JaccardSucc => "jaccard_succ",
            Self::Depth => "depth_similarity",
            Self::Vector => "vector_similarity",
        })
    }
}

/// Error returned by [`SimilarityWeights::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    /// A weight is negative.
    #[error("weight for {signal} is negative ({value})")]
    Negative {
        /// Offending signal.
        signal: Signal,
        /// Offending value.
        value: f64,
    },
    /// A weight is NaN or infinite.
    #[error("weight for {0} is not finite")]
    NotFinite(Signal),
    /// Every weight is zero, so no signal contributes.
    #[error("all similarity weights are zero")]
    AllZero,
}

const fn one() -> f64 {
    1.0
}

/// Per-signal weights of the combined score. A weight of 0 drops the signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    /// Weight of `jaccard_pred`.
    #[serde(rename = "weight_jaccard_pred", default = "one")]
    pub jaccard_pred: f64,
    /// Weight of `jaccard_succ`.
    #[serde(rename = "weight_jaccard_succ", default = "one")]
    pub jaccard_succ: f64,
    /// Weight of `depth_similarity`.
    #[serde(rename = "weight_depth", default = "one")]
    pub depth: f64,
    /// Weight of `vector_similarity`.
    #[serde(rename = "weight_vector", default = "one")]
    pub vector: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            jaccard_pred: 1.0,
            jaccard_succ: 1.0,
            depth: 1.0,
            vector: 1.0,
        }
    }
}

impl SimilarityWeights {
    /// Weights paired with their signal, in canonical order.
    pub fn entries(&self) -> [(Signal, f64); 4] {
        [
            (Signal::JaccardPred, self.jaccard_pred),
            (Signal::JaccardSucc, self.jaccard_succ),
            (Signal::Depth, self.depth),
            (Signal::Vector, self.vector),
        ]
    }

    /// Rejects negative, non-finite and all-zero weights.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (signal, value) in self.entries() {
            if !value.is_finite() {
                return Err(WeightsError::NotFinite(signal));
            }
            if value < 0.0 {
                return Err(WeightsError::Negative { signal, value });
            }
        }
        if self.entries().iter().all(|(_, w)| *w == 0.0) {
            return Err(WeightsError::AllZero);
        }
        Ok(())
    }

    /// Weighted mean of `components` (same order as [`Self::entries`]) over
    /// the non-zero weights.
    pub fn combine(&self, components: [f64; 4]) -> f64 {
        let (num, den) = self
            .entries()
            .iter()
            .zip(components)
            .filter(|((_, w), _)| *w > 0.0)
            .fold((0.0, 0.0), |(num, den), ((_, w), c)| (num + w * c, den + w));
        if den > 0.0 {
            num / den
        } else {
            0.0
        }
    }
}

/// Error returned by [`SimilarityEngine::score`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// Both sides of the pair are the same course.
    #[error("cannot score {0} against itself")]
    SameCourse(CourseCode),
    /// A course is not a node of the graph.
    #[error("unknown course {0}")]
    UnknownCourse(CourseCode),
}

/// Component and combined scores for one pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRecord {
    /// First course.
    pub course_a: CourseCode,
    /// Second course.
    pub course_b: CourseCode,
    /// Weighted mean of the components.
    pub score_combined: f64,
    /// Predecessor-set Jaccard.
    pub jaccard_pred: f64,
    /// Successor-set Jaccard.
    pub jaccard_succ: f64,
    /// Depth proximity.
    pub depth_similarity: f64,
    /// Embedding cosine (clamped to `[0, 1]`).
    pub vector_similarity: f64,
    /// Signals scored with the fallback value 0 because input was missing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<Signal>,
}

impl SimilarityRecord {
    /// The four components in canonical order.
    pub fn components(&self) -> [f64; 4] {
        [
            self.jaccard_pred,
            self.jaccard_succ,
            self.depth_similarity,
            self.vector_similarity,
        ]
    }
}

/// Read-only scoring context: graph, depths, embeddings and weights.
///
/// `score` is a pure function of the pair; the engine holds no mutable state
/// and can be shared across threads.
#[derive(Clone, Debug)]
pub struct SimilarityEngine<'a> {
    graph: &'a CurriculumGraph,
    depths: &'a DepthMap,
    embeddings: &'a EmbeddingTable,
    weights: SimilarityWeights,
    empty_jaccard: EmptyJaccard,
    max_depth: u32,
}

impl<'a> SimilarityEngine<'a> {
    /// Creates an engine with default weights and the `Zero` Jaccard convention.
    pub fn new(
        graph: &'a CurriculumGraph,
        depths: &'a DepthMap,
        embeddings: &'a EmbeddingTable,
    ) -> Self {
        Self {
            graph,
            depths,
            embeddings,
            weights: SimilarityWeights::default(),
            empty_jaccard: EmptyJaccard::default(),
            max_depth: depths.max_depth(),
        }
    }

    /// Replaces the weights after validating them.
    pub fn with_weights(mut self, weights: SimilarityWeights) -> Result<Self, WeightsError> {
        weights.validate()?;
        self.weights = weights;
        Ok(self)
    }

    /// Selects the empty-set Jaccard convention.
    pub fn with_empty_jaccard(mut self, empty: EmptyJaccard) -> Self {
        self.empty_jaccard = empty;
        self
    }

    /// The graph the engine scores against.
    pub fn graph(&self) -> &'a CurriculumGraph {
        self.graph
    }

    /// Active weights.
    pub fn weights(&self) -> &SimilarityWeights {
        &self.weights
    }

    /// Scores the ordered pair `(a, b)`.
    pub fn score(
        &self,
        a: &CourseCode,
        b: &CourseCode,
    ) -> Result<SimilarityRecord, SimilarityError> {
        if a == b {
            return Err(SimilarityError::SameCourse(a.clone()));
        }
        for code in [a, b] {
            if !self.graph.contains(code) {
                return Err(SimilarityError::UnknownCourse(code.clone()));
            }
        }
        Ok(self.score_known(a, b))
    }

    /// Scores a pair already known to be two distinct nodes.
    pub(crate) fn score_known(&self, a: &CourseCode, b: &CourseCode) -> SimilarityRecord {
        let mut fallbacks = Vec::new();
        let jaccard_pred = jaccard(
            self.graph.predecessors(a),
            self.graph.predecessors(b),
            self.empty_jaccard,
        );
        let jaccard_succ = jaccard(
            self.graph.successors(a),
            self.graph.successors(b),
            self.empty_jaccard,
        );
        let depth = depth_similarity(self.depths.get(a), self.depths.get(b), self.max_depth)
            .unwrap_or_else(|| {
                fallbacks.push(Signal::Depth);
                0.0
            });
        let vector = match (self.embeddings.get(a), self.embeddings.get(b)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb),
            _ => None,
        }
        .map_or_else(
            || {
                fallbacks.push(Signal::Vector);
                0.0
            },
            |cos| cos.max(0.0),
        );
        let components = [jaccard_pred, jaccard_succ, depth, vector];
        SimilarityRecord {
            course_a: a.clone(),
            course_b: b.clone(),
            score_combined: self.weights.combine(components),
            jaccard_pred,
            jaccard_succ,
            depth_similarity: depth,
            vector_similarity: vector,
            fallbacks,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::course::Course;
    use crate::depth::compute_depths;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<CourseCode> {
        items.iter().map(|s| code(s)).collect()
    }

    fn diamond() -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        for n in ["A", "B", "C", "D"] {
            g.add_course(Course::new(code(n), n));
        }
        for (a, b) in [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")] {
            g.add_edge(&code(a), &code(b)).unwrap();
        }
        g
    }

    #[test]
    fn jaccard_basic_and_empty_conventions() {
        assert_eq!(jaccard(&set(&["A", "B"]), &set(&["B", "C"]), EmptyJaccard::Zero), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&[]), &set(&[]), EmptyJaccard::Zero), 0.0);
        assert_eq!(jaccard(&set(&[]), &set(&[]), EmptyJaccard::One), 1.0);
        assert_eq!(jaccard(&set(&["A"]), &set(&[]), EmptyJaccard::One), 0.0);
    }

    #[test]
    fn depth_similarity_edges() {
        assert_eq!(depth_similarity(Some(1), Some(1), 2), Some(1.0));
        assert_eq!(depth_similarity(Some(0), Some(2), 2), Some(0.0));
        assert_eq!(depth_similarity(Some(0), Some(1), 4), Some(0.75));
        assert_eq!(depth_similarity(Some(0), Some(0), 0), Some(1.0));
        assert_eq!(depth_similarity(None, Some(0), 3), None);
    }

    #[test]
    fn cosine_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]), Some(1.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), Some(-1.0));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
    }

    #[test]
    fn weights_validation() {
        assert!(SimilarityWeights::default().validate().is_ok());
        let zero = SimilarityWeights {
            jaccard_pred: 0.0,
            jaccard_succ: 0.0,
            depth: 0.0,
            vector: 0.0,
        };
        assert_eq!(zero.validate(), Err(WeightsError::AllZero));
        let neg = SimilarityWeights {
            depth: -1.0,
            ..SimilarityWeights::default()
        };
        assert!(matches!(neg.validate(), Err(WeightsError::Negative { signal: Signal::Depth, .. })));
        let nan = SimilarityWeights {
            vector: f64::NAN,
            ..SimilarityWeights::default()
        };
        assert_eq!(nan.validate(), Err(WeightsError::NotFinite(Signal::Vector)));
    }

    #[test]
    fn weights_deserialize_with_option_names() {
        let w: SimilarityWeights =
            serde_json::from_str(r#"{"weight_vector": 0.0, "weight_depth": 2.5}"#).unwrap();
        assert_eq!(w.vector, 0.0);
        assert_eq!(w.depth, 2.5);
        assert_eq!(w.jaccard_pred, 1.0);
    }

    #[test]
    fn diamond_siblings_score() {
        let g = diamond();
        let depths = compute_depths(&g).unwrap();
        let mut table = EmbeddingTable::new();
        table.insert(code("B"), vec![1.0, 0.0]).unwrap();
        table.insert(code("C"), vec![1.0, 0.0]).unwrap();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        let rec = engine.score(&code("B"), &code("C")).unwrap();
        assert_eq!(rec.jaccard_pred, 1.0);
        assert_eq!(rec.jaccard_succ, 1.0);
        assert_eq!(rec.depth_similarity, 1.0);
        assert_eq!(rec.vector_similarity, 1.0);
        assert_eq!(rec.score_combined, 1.0);
        assert!(rec.fallbacks.is_empty());
    }

    #[test]
    fn missing_embedding_is_a_recorded_fallback() {
        let g = diamond();
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        let rec = engine.score(&code("A"), &code("D")).unwrap();
        assert_eq!(rec.vector_similarity, 0.0);
        assert_eq!(rec.fallbacks, [Signal::Vector]);
        assert_eq!(rec.depth_similarity, 0.0);
        assert_eq!(rec.score_combined, 0.0);
    }

    #[test]
    fn zero_weight_drops_the_signal() {
        let g = diamond();
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table)
            .with_weights(SimilarityWeights {
                vector: 0.0,
                ..SimilarityWeights::default()
            })
            .unwrap();
        let rec = engine.score(&code("B"), &code("C")).unwrap();
        assert_eq!(rec.score_combined, 1.0);
    }

    #[test]
    fn rejects_self_and_unknown_pairs() {
        let g = diamond();
        let depths = compute_depths(&g).unwrap();
        let table = EmbeddingTable::new();
        let engine = SimilarityEngine::new(&g, &depths, &table);
        assert_eq!(
            engine.score(&code("A"), &code("A")),
            Err(SimilarityError::SameCourse(code("A")))
        );
        assert_eq!(
            engine.score(&code("A"), &code("Q")),
            Err(SimilarityError::UnknownCourse(code("Q")))
        );
    }

    #[test]
    fn embedding_table_enforces_dimension() {
        let mut table = EmbeddingTable::new();
        table.insert(code("A"), vec![1.0, 2.0]).unwrap();
        assert_eq!(
            table.insert(code("B"), vec![1.0]),
            Err(EmbeddingError::DimensionMismatch {
                code: code("B"),
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            table.insert(code("C"), vec![f32::NAN, 1.0]),
            Err(EmbeddingError::Invalid(code("C")))
        );
        let provider = |c: &CourseCode| (c.as_str() != "X").then(|| vec![0.5, 0.5]);
        let codes = [code("X"), code("Y")];
        let materialized = EmbeddingTable::materialize(&provider, codes.iter());
        assert_eq!(materialized.len(), 1);
        assert!(materialized.get(&code("Y")).is_some());
    }

    #[test]
    fn materialize_drops_rejected_vectors() {
        let provider = |c: &CourseCode| match c.as_str() {
            "A" => Some(vec![1.0, 0.0]),
            "B" => Some(vec![1.0]),
            _ => Some(vec![f32::INFINITY, 0.0]),
        };
        let codes = [code("A"), code("B"), code("C")];
        let table = EmbeddingTable::materialize(&provider, codes.iter());
        assert_eq!(table.len(), 1);
        assert_eq!(table.dimension(), Some(2));
        assert!(table.get(&code("B")).is_none());
    }
}
