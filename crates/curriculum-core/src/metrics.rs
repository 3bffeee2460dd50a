// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph-centrality metrics per course: degree centrality and betweenness.
use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::CurriculumGraph;
use crate::ident::CourseCode;

/// One row of the centrality table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentralityRow {
    /// Course code.
    pub course: CourseCode,
    /// `(in-degree + out-degree) / (n - 1)`; 0 for a single-course graph.
    pub degree_centrality: f64,
    /// Normalised directed betweenness.
    pub betweenness: f64,
}

/// Degree centrality of every course, keyed by code.
pub fn degree_centrality(graph: &CurriculumGraph) -> BTreeMap<CourseCode, f64> {
    let n = graph.node_count();
    graph
        .nodes()
        .map(|c| {
            let value = if n <= 1 {
                0.0
            } else {
                let degree = graph.predecessors(c).len() + graph.successors(c).len();
                degree as f64 / (n - 1) as f64
            };
            (c.clone(), value)
        })
        .collect()
}

/// Betweenness of every course (Brandes), following edge direction.
///
/// Scores are scaled by `1 / ((n - 1)(n - 2))` when `n > 2`, so a course that
/// lies on every shortest path between every other ordered pair scores 1.
/// Sources and neighbours are visited in code order, which fixes the
/// floating-point accumulation order.
pub fn betweenness_centrality(graph: &CurriculumGraph) -> BTreeMap<CourseCode, f64> {
    let codes: Vec<&CourseCode> = graph.nodes().collect();
    let n = codes.len();
    let index: BTreeMap<&CourseCode, usize> =
        codes.iter().enumerate().map(|(i, c)| (*c, i)).collect();
    let adjacency: Vec<Vec<usize>> = codes
        .iter()
        .map(|c| {
            graph
                .successors(c)
                .iter()
                .filter_map(|s| index.get(s).copied())
                .collect()
        })
        .collect();

    let mut scores = vec![0.0_f64; n];
    for source in 0..n {
        let mut stack = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut dist: Vec<Option<usize>> = vec![None; n];
        sigma[source] = 1.0;
        dist[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            let Some(dv) = dist[v] else { continue };
            for &w in &adjacency[v] {
                if dist[w].is_none() {
                    dist[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if dist[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for s in &mut scores {
            *s *= scale;
        }
    }
    codes.into_iter().cloned().zip(scores).collect()
}

/// Centrality table ordered by code.
pub fn centrality_rows(graph: &CurriculumGraph) -> Vec<CentralityRow> {
    let degree = degree_centrality(graph);
    let betweenness = betweenness_centrality(graph);
    let rows: Vec<CentralityRow> = degree
        .into_iter()
        .map(|(course, degree_centrality)| {
            let betweenness = betweenness.get(&course).copied().unwrap_or(0.0);
            CentralityRow {
                course,
                degree_centrality,
                betweenness,
            }
        })
        .collect();
    debug!(courses = rows.len(), "computed centrality");
    rows
}
