// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Longest-path depth over an acyclic curriculum graph.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::graph::CurriculumGraph;
use crate::ident::CourseCode;

/// Error returned by [`compute_depths`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepthError {
    /// The graph still contains a cycle; no topological order exists.
    ///
    /// `remaining` lists every course that could not be ordered (the cycle
    /// members and everything downstream of them).
    #[error("graph contains a cycle; {} courses cannot be ordered", .remaining.len())]
    CycleDetected {
        /// Courses left unprocessed, ascending.
        remaining: Vec<CourseCode>,
    },
}

/// Course code to depth. Roots have depth 0; every other course sits one level
/// below its deepest prerequisite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepthMap(BTreeMap<CourseCode, u32>);

impl DepthMap {
    /// Depth of `code`, if assigned.
    pub fn get(&self, code: &CourseCode) -> Option<u32> {
        self.0.get(code).copied()
    }

    /// Largest depth in the map (0 for an empty map).
    pub fn max_depth(&self) -> u32 {
        self.0.values().copied().max().unwrap_or(0)
    }

    /// Iterates `(code, depth)` in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CourseCode, u32)> {
        self.0.iter().map(|(c, d)| (c, *d))
    }

    /// Number of courses with a depth.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no depths are assigned.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CourseCode, u32)> for DepthMap {
    fn from_iter<T: IntoIterator<Item = (CourseCode, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Computes the depth of every course.
///
/// Processes courses in topological order (Kahn's algorithm, ready set
/// ordered by code). Fails with [`DepthError::CycleDetected`] instead of
/// returning a partial map when the graph is not acyclic.
pub fn compute_depths(graph: &CurriculumGraph) -> Result<DepthMap, DepthError> {
    let mut in_degree: BTreeMap<&CourseCode, usize> = graph
        .nodes()
        .map(|c| (c, graph.predecessors(c).len()))
        .collect();
    let mut ready: BTreeSet<&CourseCode> = in_degree
        .iter()
        .filter(|(_, &deg)| deg == 0)
        .map(|(&c, _)| c)
        .collect();
    let mut depths: BTreeMap<CourseCode, u32> = BTreeMap::new();

    while let Some(course) = ready.pop_first() {
        let depth = graph
            .predecessors(course)
            .iter()
            .filter_map(|p| depths.get(p))
            .max()
            .map_or(0, |d| d + 1);
        depths.insert(course.clone(), depth);
        for next in graph.successors(course) {
            if let Some(deg) = in_degree.get_mut(next) {
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(next);
                }
            }
        }
    }

    if depths.len() != graph.node_count() {
        let remaining: Vec<CourseCode> = graph
            .nodes()
            .filter(|c| !depths.contains_key(*c))
            .cloned()
            .collect();
        return Err(DepthError::CycleDetected { remaining });
    }

    let map = DepthMap(depths);
    debug!(courses = map.len(), max_depth = map.max_depth(), "computed depths");
    Ok(map)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::course::Course;

    fn code(s: &str) -> CourseCode {
        CourseCode::new(s).unwrap()
    }

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> CurriculumGraph {
        let mut g = CurriculumGraph::new();
        for n in nodes {
            g.add_course(Course::new(code(n), *n));
        }
        for (a, b) in edges {
            g.add_edge(&code(a), &code(b)).unwrap();
        }
        g
    }

    #[test]
    fn diamond_depths() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let depths = compute_depths(&g).unwrap();
        assert_eq!(depths.get(&code("A")), Some(0));
        assert_eq!(depths.get(&code("B")), Some(1));
        assert_eq!(depths.get(&code("C")), Some(1));
        assert_eq!(depths.get(&code("D")), Some(2));
        assert_eq!(depths.max_depth(), 2);
    }

    #[test]
    fn depth_is_longest_path_not_shortest() {
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
        );
        assert_eq!(compute_depths(&g).unwrap().get(&code("D")), Some(3));
    }

    #[test]
    fn isolated_courses_are_roots() {
        let g = graph(&["A", "B"], &[]);
        let depths = compute_depths(&g).unwrap();
        assert_eq!(depths.len(), 2);
        assert_eq!(depths.max_depth(), 0);
    }

    #[test]
    fn cycle_is_reported_not_defaulted() {
        let g = graph(
            &["A", "B", "C", "R"],
            &[("R", "A"), ("A", "B"), ("B", "A"), ("B", "C")],
        );
        let err = compute_depths(&g).unwrap_err();
        assert_eq!(
            err,
            DepthError::CycleDetected {
                remaining: vec![code("A"), code("B"), code("C")]
            }
        );
    }

    #[test]
    fn empty_graph_has_empty_map() {
        let depths = compute_depths(&CurriculumGraph::new()).unwrap();
        assert!(depths.is_empty());
        assert_eq!(depths.max_depth(), 0);
    }
}
