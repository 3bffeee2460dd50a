// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Catalog rows to curriculum graph.
//!
//! The build runs in three folds over the rows:
//!
//! 1. name lookup: normalised course name to course code;
//! 2. nodes: one course per distinct code;
//! 3. edges: every recommendation fragment that resolves to a known course
//!    becomes an edge `prerequisite -> row course`.
//!
//! Nothing in the build is fatal. Rows without a code, fragments that resolve
//! to nothing and courses that recommend themselves are recorded in the
//! [`BuildReport`] and otherwise ignored.
//!
//! When two codes share a normalised name the lookup resolves to the smallest
//! code, so the resulting edge set never depends on row order.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::course::{CatalogRow, Course};
use crate::graph::{CurriculumGraph, GraphError};
use crate::ident::CourseCode;
use crate::normalize::{FoldingNormalizer, TextNormalizer};

/// Default separator between recommended course names.
pub const DEFAULT_DELIMITER: &str = ";";

/// Why a row was skipped.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The row has no (non-blank) course code.
    MissingCode,
}

/// A catalog row the builder did not turn into a node.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based row index in the input.
    pub index: usize,
    /// Name carried by the row, for auditing.
    pub name: String,
    /// Why the row was skipped.
    pub reason: SkipReason,
}

/// A recommendation fragment that matched no catalog course.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct UnresolvedFragment {
    /// Course whose recommendation text contained the fragment.
    pub course: CourseCode,
    /// The fragment as written (trimmed).
    pub fragment: String,
}

/// Non-fatal observations made while building a graph.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct BuildReport {
    /// Rows that produced no node.
    pub skipped_rows: Vec<SkippedRow>,
    /// Fragments that produced no edge because they named no known course.
    pub unresolved: Vec<UnresolvedFragment>,
    /// Courses whose recommendation text named the course itself.
    pub self_references: Vec<CourseCode>,
    /// Fragments that named an already-present edge.
    pub duplicate_edges: usize,
}

/// Result of [`GraphBuilder::build`].
#[derive(Clone, Debug)]
pub struct BuildOutcome {
    /// The (possibly cyclic) prerequisite graph.
    pub graph: CurriculumGraph,
    /// What was skipped or dropped along the way.
    pub report: BuildReport,
}

/// Builds a [`CurriculumGraph`] from catalog rows.
#[derive(Clone, Debug)]
pub struct GraphBuilder<N = FoldingNormalizer> {
    normalizer: N,
    delimiter: String,
}

impl Default for GraphBuilder<FoldingNormalizer> {
    fn default() -> Self {
        Self::new(FoldingNormalizer)
    }
}

impl<N: TextNormalizer> GraphBuilder<N> {
    /// Creates a builder with the given normaliser and the default `;` delimiter.
    pub fn new(normalizer: N) -> Self {
        Self {
            normalizer,
            delimiter: DEFAULT_DELIMITER.to_owned(),
        }
    }

    /// Overrides the recommendation delimiter.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Builds the graph. Never fails; see [`BuildReport`] for what was dropped.
    pub fn build(&self, rows: &[CatalogRow]) -> BuildOutcome {
        let keyed: Vec<(usize, &CatalogRow, Option<CourseCode>)> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, row, row.code.as_deref().and_then(CourseCode::new)))
            .collect();

        let lookup = keyed
            .iter()
            .filter_map(|(_, row, code)| code.as_ref().map(|c| (row, c)))
            .fold(BTreeMap::new(), |mut lookup, (row, code)| {
                let key = self.normalizer.normalize(&row.name);
                if !key.is_empty() {
                    lookup
                        .entry(key)
                        .and_modify(|existing: &mut CourseCode| {
                            if *code < *existing {
                                *existing = code.clone();
                            }
                        })
                        .or_insert_with(|| code.clone());
                }
                lookup
            });

        let (graph, mut report) = keyed.iter().fold(
            (CurriculumGraph::new(), BuildReport::default()),
            |(mut graph, mut report), (index, row, code)| {
                match code {
                    Some(code) => {
                        graph.add_course(Course {
                            code: code.clone(),
                            name: row.name.clone(),
                            workload: row.workload,
                        });
                    }
                    None => report.skipped_rows.push(SkippedRow {
                        index: *index,
                        name: row.name.clone(),
                        reason: SkipReason::MissingCode,
                    }),
                }
                (graph, report)
            },
        );

        let graph = keyed
            .iter()
            .filter_map(|(_, row, code)| Some((code.as_ref()?, row.recommendation.as_deref()?)))
            .fold(graph, |mut graph, (course, text)| {
                for fragment in text
                    .split(self.delimiter.as_str())
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                {
                    let Some(prereq) = lookup.get(&self.normalizer.normalize(fragment)) else {
                        report.unresolved.push(UnresolvedFragment {
                            course: course.clone(),
                            fragment: fragment.to_owned(),
                        });
                        continue;
                    };
                    match graph.add_edge(prereq, course) {
                        Ok(true) => {}
                        Ok(false) => report.duplicate_edges += 1,
                        Err(GraphError::SelfLoop(code)) => report.self_references.push(code),
                        // Both endpoints were inserted in the node fold.
                        Err(GraphError::UnknownCourse(_)) => {}
                    }
                }
                graph
            });

        if !report.skipped_rows.is_empty() {
            warn!(
                skipped = report.skipped_rows.len(),
                "catalog rows without a course code were skipped"
            );
        }
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unresolved = report.unresolved.len(),
            self_references = report.self_references.len(),
            "built curriculum graph"
        );
        BuildOutcome { graph, report }
    }
}
