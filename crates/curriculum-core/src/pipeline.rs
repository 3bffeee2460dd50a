// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! End-to-end pipeline: build, enforce acyclicity, depth, score, rank.
use thiserror::Error;
use tracing::{info, info_span};

use crate::acyclic::{enforce_acyclic, RemovedEdge};
use crate::builder::{BuildReport, GraphBuilder};
use crate::config::{ConfigError, ScoringConfig};
use crate::course::CatalogRow;
use crate::credit::{CoursePair, CreditFilter, CreditTable, FilterReport, WorkloadTable};
use crate::depth::{compute_depths, DepthError, DepthMap};
use crate::graph::CurriculumGraph;
use crate::metrics::{centrality_rows, CentralityRow};
use crate::normalize::{FoldingNormalizer, TextNormalizer};
use crate::rank::{rank_all, Ranking};
use crate::scoring::score_all_pairs;
use crate::similarity::{
    EmbeddingProvider, EmbeddingTable, SimilarityEngine, SimilarityRecord, WeightsError,
};

/// Error returned by [`Pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Weights were rejected by the similarity engine.
    #[error(transparent)]
    Weights(#[from] WeightsError),
    /// Depth assignment found a cycle the enforcer left behind.
    #[error(transparent)]
    Depth(#[from] DepthError),
}

/// Every artefact produced by [`Pipeline::run`].
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    /// Graph exactly as built from the catalog.
    pub raw_graph: CurriculumGraph,
    /// Rows and fragments dropped during the build.
    pub build_report: BuildReport,
    /// Acyclic graph used for depth and scoring.
    pub graph: CurriculumGraph,
    /// Edges removed to reach `graph`.
    pub removed_edges: Vec<RemovedEdge>,
    /// Depth of every course in `graph`.
    pub depths: DepthMap,
    /// Degree centrality and betweenness of every course in `graph`.
    pub centrality: Vec<CentralityRow>,
    /// Embeddings pulled from the provider before scoring.
    pub embeddings: EmbeddingTable,
    /// One record per scored pair, ordered by `(course_a, course_b)`.
    pub similarities: Vec<SimilarityRecord>,
    /// Top-K table for every course.
    pub rankings: Vec<Ranking>,
}

impl PipelineOutput {
    /// Workloads carried by the catalog, for credit filtering.
    pub fn workloads(&self) -> WorkloadTable {
        WorkloadTable::from_graph(&self.graph)
    }
}

/// Configured pipeline.
#[derive(Clone, Debug)]
pub struct Pipeline<N = FoldingNormalizer> {
    config: ScoringConfig,
    normalizer: N,
}

impl Pipeline<FoldingNormalizer> {
    /// Pipeline with the default accent-folding normaliser.
    pub fn new(config: ScoringConfig) -> Self {
        Self::with_normalizer(config, FoldingNormalizer)
    }
}

impl<N: TextNormalizer + Clone> Pipeline<N> {
    /// Pipeline with a custom name normaliser.
    pub fn with_normalizer(config: ScoringConfig, normalizer: N) -> Self {
        Self { config, normalizer }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Runs every stage over `rows`.
    ///
    /// Embeddings are materialised from `provider` before scoring starts.
    pub fn run<P>(&self, rows: &[CatalogRow], provider: &P) -> Result<PipelineOutput, PipelineError>
    where
        P: EmbeddingProvider + ?Sized,
    {
        self.config.validate()?;
        let _pipeline = info_span!("pipeline", rows = rows.len()).entered();

        let built = info_span!("build").in_scope(|| {
            GraphBuilder::new(self.normalizer.clone())
                .with_delimiter(self.config.delimiter.clone())
                .build(rows)
        });
        let acyclic = info_span!("acyclic").in_scope(|| enforce_acyclic(built.graph.clone()));
        let depths = info_span!("depth").in_scope(|| compute_depths(&acyclic.graph))?;
        let centrality = info_span!("metrics").in_scope(|| centrality_rows(&acyclic.graph));
        let embeddings = EmbeddingTable::materialize(provider, acyclic.graph.nodes());

        let similarities = {
            let _score = info_span!("score", workers = self.config.workers).entered();
            let engine = SimilarityEngine::new(&acyclic.graph, &depths, &embeddings)
                .with_weights(self.config.weights)?
                .with_empty_jaccard(self.config.empty_jaccard);
            score_all_pairs(&engine, self.config.pair_mode, self.config.workers)
        };
        let rankings = info_span!("rank").in_scope(|| rank_all(&similarities, self.config.top_k));

        info!(
            courses = acyclic.graph.node_count(),
            edges = acyclic.graph.edge_count(),
            removed = acyclic.removed.len(),
            pairs = similarities.len(),
            "pipeline finished"
        );
        Ok(PipelineOutput {
            raw_graph: built.graph,
            build_report: built.report,
            graph: acyclic.graph,
            removed_edges: acyclic.removed,
            depths,
            centrality,
            embeddings,
            similarities,
            rankings,
        })
    }

    /// Applies the configured credit policy to `pairs`.
    pub fn filter(
        &self,
        pairs: &[CoursePair],
        credits: &CreditTable,
        workloads: &WorkloadTable,
    ) -> FilterReport {
        let _span = info_span!("filter", pairs = pairs.len()).entered();
        CreditFilter::new(self.config.credit_policy, credits, workloads).apply(pairs)
    }
}
