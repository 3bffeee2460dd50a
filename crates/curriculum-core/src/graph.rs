// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Adjacency-based curriculum graph.
//!
//! Nodes are courses keyed by [`CourseCode`]; an edge `p -> c` means "`p` is a
//! prerequisite of `c`". Forward and reverse adjacency are both kept so that
//! `predecessors` and `successors` are `O(log n)` lookups.
//!
//! Invariants maintained by every mutation:
//! - no self-loops;
//! - no duplicate edges (adjacency is a set);
//! - both endpoints of every edge are nodes of the graph.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::course::Course;
use crate::ident::CourseCode;

/// Error returned by [`CurriculumGraph::add_edge`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The edge would connect a course to itself.
    #[error("self-loop on {0}")]
    SelfLoop(CourseCode),
    /// An endpoint is not a node of the graph.
    #[error("unknown course {0}")]
    UnknownCourse(CourseCode),
}

/// A directed prerequisite edge.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Edge {
    /// The prerequisite course.
    pub from: CourseCode,
    /// The dependent course.
    pub to: CourseCode,
}

static EMPTY: BTreeSet<CourseCode> = BTreeSet::new();

/// The set of courses plus prerequisite edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CurriculumGraph {
    nodes: BTreeMap<CourseCode, Course>,
    successors: BTreeMap<CourseCode, BTreeSet<CourseCode>>,
    predecessors: BTreeMap<CourseCode, BTreeSet<CourseCode>>,
    edge_count: usize,
}

impl CurriculumGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a course if its code is not yet present.
    ///
    /// Returns `true` when the course was added. An existing node keeps its
    /// attributes.
    pub fn add_course(&mut self, course: Course) -> bool {
        if self.nodes.contains_key(&course.code) {
            return false;
        }
        self.nodes.insert(course.code.clone(), course);
        true
    }

    /// Adds the edge `from -> to`.
    ///
    /// Returns `Ok(false)` if the edge already existed.
    pub fn add_edge(&mut self, from: &CourseCode, to: &CourseCode) -> Result<bool, GraphError> {
        if from == to {
            return Err(GraphError::SelfLoop(from.clone()));
        }
        for code in [from, to] {
            if !self.nodes.contains_key(code) {
                return Err(GraphError::UnknownCourse(code.clone()));
            }
        }
        let inserted = self
            .successors
            .entry(from.clone())
            .or_default()
            .insert(to.clone());
        if inserted {
            self.predecessors
                .entry(to.clone())
                .or_default()
                .insert(from.clone());
            self.edge_count += 1;
        }
        Ok(inserted)
    }

    /// Removes the edge `from -> to`, returning whether it existed.
    pub fn remove_edge(&mut self, from: &CourseCode, to: &CourseCode) -> bool {
        let removed = self
            .successors
            .get_mut(from)
            .is_some_and(|succ| succ.remove(to));
        if removed {
            if let Some(pred) = self.predecessors.get_mut(to) {
                pred.remove(from);
            }
            self.edge_count -= 1;
        }
        removed
    }

    /// Returns `true` if the edge `from -> to` exists.
    pub fn has_edge(&self, from: &CourseCode, to: &CourseCode) -> bool {
        self.successors
            .get(from)
            .is_some_and(|succ| succ.contains(to))
    }

    /// Returns `true` if `code` is a node.
    pub fn contains(&self, code: &CourseCode) -> bool {
        self.nodes.contains_key(code)
    }

    /// Returns the course stored for `code`.
    pub fn course(&self, code: &CourseCode) -> Option<&Course> {
        self.nodes.get(code)
    }

    /// Iterates over all courses in ascending code order.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.nodes.values()
    }

    /// Iterates over all course codes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = &CourseCode> {
        self.nodes.keys()
    }

    /// Iterates over all edges ordered by `(from, to)`.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.successors.iter().flat_map(|(from, succ)| {
            succ.iter().map(move |to| Edge {
                from: from.clone(),
                to: to.clone(),
            })
        })
    }

    /// Direct prerequisites of `code` (empty for unknown codes).
    pub fn predecessors(&self, code: &CourseCode) -> &BTreeSet<CourseCode> {
        self.predecessors.get(code).unwrap_or(&EMPTY)
    }

    /// Courses that directly require `code` (empty for unknown codes).
    pub fn successors(&self, code: &CourseCode) -> &BTreeSet<CourseCode> {
        self.successors.get(code).unwrap_or(&EMPTY)
    }

    /// Number of courses.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn graph(nodes: &[&str]) -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        for n in nodes {
            g.add_course(Course::new(code(n), *n));
        }
        g
    }

    #[test]
    fn add_edge_rejects_self_loops_and_unknown_endpoints() {
        let mut g = graph(&["A", "B"]);
        assert_eq!(
            g.add_edge(&code("A"), &code("A")),
            Err(GraphError::SelfLoop(code("A")))
        );
        assert_eq!(
            g.add_edge(&code("A"), &code("Z")),
            Err(GraphError::UnknownCourse(code("Z")))
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = graph(&["A", "B"]);
        assert_eq!(g.add_edge(&code("A"), &code("B")), Ok(true));
        assert_eq!(g.add_edge(&code("A"), &code("B")), Ok(false));
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges().count(), 1);
    }

    #[test]
    fn adjacency_is_kept_in_both_directions() {
        let mut g = graph(&["A", "B", "C"]);
        g.add_edge(&code("A"), &code("C")).unwrap();
        g.add_edge(&code("B"), &code("C")).unwrap();
        let preds: Vec<_> = g.predecessors(&code("C")).iter().map(CourseCode::as_str).collect();
        assert_eq!(preds, ["A", "B"]);
        assert!(g.successors(&code("A")).contains(&code("C")));
        assert!(g.predecessors(&code("A")).is_empty());
        assert!(g.successors(&code("nope")).is_empty());
    }

    #[test]
    fn remove_edge_updates_both_sides() {
        let mut g = graph(&["A", "B"]);
        g.add_edge(&code("A"), &code("B")).unwrap();
        assert!(g.remove_edge(&code("A"), &code("B")));
        assert!(!g.remove_edge(&code("A"), &code("B")));
        assert!(!g.has_edge(&code("A"), &code("B")));
        assert!(g.predecessors(&code("B")).is_empty());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn add_course_keeps_first_attributes() {
        let mut g = CurriculumGraph::new();
        assert!(g.add_course(Course::new(code("A"), "first")));
        assert!(!g.add_course(Course::new(code("A"), "second")));
        assert_eq!(g.course(&code("A")).unwrap().name, "first");
    }
}
