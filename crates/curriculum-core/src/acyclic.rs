// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cycle detection and removal.
//!
//! Catalog data occasionally contains prerequisite loops (two courses that
//! recommend each other). Depth assignment needs an acyclic skeleton, so
//! [`enforce_acyclic`] repeatedly finds one cycle and deletes one of its edges
//! until none remain. This is a heuristic: it does not minimise the number of
//! removed edges.
//!
//! # Canonical order
//!
//! The search visits start nodes and successors in ascending code order. A
//! found cycle is rotated to begin at its smallest code, and the edge leaving
//! that code is the one removed. The removed set is therefore a pure function
//! of the input graph.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{CurriculumGraph, Edge};
use crate::ident::CourseCode;

/// An edge deleted to break a cycle.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct RemovedEdge {
    /// Prerequisite endpoint.
    pub from: CourseCode,
    /// Dependent endpoint.
    pub to: CourseCode,
    /// The cycle the edge belonged to, starting at `from`.
    pub cycle: Vec<CourseCode>,
}

impl RemovedEdge {
    /// The removed edge without the cycle context.
    pub fn edge(&self) -> Edge {
        Edge {
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

/// Result of [`enforce_acyclic`].
#[derive(Clone, Debug)]
pub struct AcyclicOutcome {
    /// Same node set as the input, edges a subset of the input's.
    pub graph: CurriculumGraph,
    /// Edges removed, in removal order.
    pub removed: Vec<RemovedEdge>,
}

/// Finds one directed cycle, if any.
///
/// The returned nodes `c0, c1, ..., ck` describe the cycle
/// `c0 -> c1 -> ... -> ck -> c0`, with `c0` the smallest code on it.
pub fn find_cycle(graph: &CurriculumGraph) -> Option<Vec<CourseCode>> {
    let mut done: BTreeSet<&CourseCode> = BTreeSet::new();
    for start in graph.nodes() {
        if done.contains(start) {
            continue;
        }
        let mut stack = vec![(start, graph.successors(start).iter())];
        let mut on_path: BTreeSet<&CourseCode> = BTreeSet::from([start]);
        while let Some((node, successors)) = stack.last_mut() {
            let node = *node;
            match successors.next() {
                Some(next) if on_path.contains(next) => {
                    if let Some(pos) = stack.iter().position(|(n, _)| *n == next) {
                        let cycle = stack[pos..].iter().map(|(n, _)| (*n).clone()).collect();
                        return Some(rotate_to_smallest(cycle));
                    }
                }
                Some(next) if done.contains(next) => {}
                Some(next) => {
                    on_path.insert(next);
                    stack.push((next, graph.successors(next).iter()));
                }
                None => {
                    on_path.remove(node);
                    done.insert(node);
                    stack.pop();
                }
            }
        }
    }
    None
}

fn rotate_to_smallest(mut cycle: Vec<CourseCode>) -> Vec<CourseCode> {
    let smallest = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map_or(0, |(i, _)| i);
    cycle.rotate_left(smallest);
    cycle
}

/// Returns `true` if the graph has no directed cycle.
pub fn is_acyclic(graph: &CurriculumGraph) -> bool {
    find_cycle(graph).is_none()
}

/// Removes edges until the graph is acyclic.
///
/// Terminates because every iteration deletes one edge.
pub fn enforce_acyclic(mut graph: CurriculumGraph) -> AcyclicOutcome {
    let mut removed = Vec::new();
    while let Some(cycle) = find_cycle(&graph) {
        let (Some(from), Some(to)) = (cycle.first(), cycle.get(1 % cycle.len())) else {
            break;
        };
        let (from, to) = (from.clone(), to.clone());
        if !graph.remove_edge(&from, &to) {
            break;
        }
        warn!(%from, %to, cycle_len = cycle.len(), "removed prerequisite edge to break cycle");
        removed.push(RemovedEdge { from, to, cycle });
    }
    debug!(
        removed = removed.len(),
        edges = graph.edge_count(),
        "curriculum graph is acyclic"
    );
    AcyclicOutcome { graph, removed }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::course::Course;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn graph(edges: &[(&str, &str)]) -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        for (a, b) in edges {
            g.add_course(Course::new(code(a), *a));
            g.add_course(Course::new(code(b), *b));
            g.add_edge(&code(a), &code(b)).unwrap();
        }
        g
    }

    #[test]
    fn dag_has_no_cycle() {
        let g = graph(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        assert!(find_cycle(&g).is_none());
        let out = enforce_acyclic(g.clone());
        assert!(out.removed.is_empty());
        assert_eq!(out.graph, g);
    }

    #[test]
    fn finds_rotated_cycle() {
        let g = graph(&[("X", "C"), ("C", "B"), ("B", "C2"), ("C2", "C")]);
        let cycle = find_cycle(&g).unwrap();
        assert_eq!(cycle, [code("B"), code("C2"), code("C")]);
    }

    #[test]
    fn two_cycle_removes_edge_from_smaller_code() {
        let g = graph(&[("A", "B"), ("B", "A")]);
        let out = enforce_acyclic(g);
        assert_eq!(out.removed.len(), 1);
        assert_eq!(out.removed[0].edge(), Edge { from: code("A"), to: code("B") });
        assert!(out.graph.has_edge(&code("B"), &code("A")));
        assert!(is_acyclic(&out.graph));
    }

    #[test]
    fn overlapping_cycles_are_all_broken() {
        let g = graph(&[
            ("A", "B"),
            ("B", "C"),
            ("C", "A"),
            ("C", "D"),
            ("D", "B"),
            ("D", "E"),
        ]);
        let nodes_before: Vec<_> = g.nodes().cloned().collect();
        let edges_before: BTreeSet<_> = g.edges().collect();
        let out = enforce_acyclic(g);
        assert!(is_acyclic(&out.graph));
        assert_eq!(out.graph.nodes().cloned().collect::<Vec<_>>(), nodes_before);
        assert!(out.graph.edges().all(|e| edges_before.contains(&e)));
        assert_eq!(
            out.graph.edge_count() + out.removed.len(),
            edges_before.len()
        );
    }
}
