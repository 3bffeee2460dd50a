// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! curriculum-core: course prerequisite graphs and structural similarity.
//!
//! Catalog rows are folded into a [`CurriculumGraph`], cycles are broken
//! canonically, every course gets a longest-path depth, and every pair of
//! courses is scored on four signals (shared prerequisites, shared
//! dependents, depth proximity, embedding cosine). A ranker picks the top-K
//! neighbours per course and a credit filter classifies course pairs by
//! workload compatibility.
//!
//! All maps are ordered and every tie is broken by course code, so each stage
//! is a pure function of its inputs.
#![forbid(unsafe_code)]

pub mod acyclic;
pub mod builder;
pub mod config;
pub mod course;
pub mod credit;
pub mod depth;
pub mod export;
pub mod graph;
pub mod ident;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod scoring;
pub mod similarity;
pub mod workload;

pub use acyclic::{enforce_acyclic, find_cycle, is_acyclic, AcyclicOutcome, RemovedEdge};
pub use builder::{BuildOutcome, BuildReport, GraphBuilder};
pub use config::{ConfigError, ConfigService, ConfigStore, ScoringConfig};
pub use course::{CatalogRow, Course};
pub use credit::{
    CoursePair, CreditFilter, CreditPolicy, CreditTable, FilterDecision, FilterReport, Verdict,
    WorkloadTable,
};
pub use depth::{compute_depths, DepthError, DepthMap};
pub use export::{DepthRow, FilterRow, GraphExport};
pub use graph::{CurriculumGraph, Edge, GraphError};
pub use ident::{CourseCode, CourseCodeParts};
pub use metrics::{centrality_rows, CentralityRow};
pub use normalize::{FoldingNormalizer, TextNormalizer};
pub use pipeline::{Pipeline, PipelineError, PipelineOutput};
pub use rank::{rank_all, top_k, Ranking};
pub use scoring::{score_all_pairs, score_all_pairs_serial, PairMode};
pub use similarity::{
    EmbeddingProvider, EmbeddingTable, EmptyJaccard, SimilarityEngine, SimilarityError,
    SimilarityRecord, SimilarityWeights,
};
pub use workload::Workload;
