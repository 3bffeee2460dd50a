// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flat export forms of the pipeline artefacts.
//!
//! [`GraphExport`] is the interchange form of a curriculum graph: nodes and
//! edges sorted canonically, so two builds of the same catalog serialise to
//! the same bytes. [`GraphExport::to_canonical_bytes`] encodes it as CBOR and
//! [`GraphExport::compute_hash`] hashes those bytes with BLAKE3.
use ciborium::ser::into_writer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credit::{FilterDecision, FilterReport};
use crate::depth::DepthMap;
use crate::graph::{CurriculumGraph, Edge};
use crate::ident::CourseCode;
use crate::workload::Workload;

/// BLAKE3 digest of a canonical encoding.
pub type Hash32 = [u8; 32];

/// Error returned when encoding an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CBOR encoding failed.
    #[error("canonical encoding failed: {0}")]
    Encode(String),
}

/// A node of the exported graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNode {
    /// Course code.
    pub code: CourseCode,
    /// Display name.
    pub name: String,
    /// Depth, when a depth map was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
    /// Structured workload, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,
}

/// Serializable snapshot of a curriculum graph.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Nodes sorted by code.
    pub nodes: Vec<ExportNode>,
    /// Edges sorted by `(from, to)`.
    pub edges: Vec<Edge>,
}

impl GraphExport {
    /// Snapshots `graph`, annotating nodes with `depths` when given.
    pub fn new(graph: &CurriculumGraph, depths: Option<&DepthMap>) -> Self {
        let nodes = graph
            .courses()
            .map(|c| ExportNode {
                code: c.code.clone(),
                name: c.name.clone(),
                depth: depths.and_then(|d| d.get(&c.code)),
                workload: c.workload,
            })
            .collect();
        Self {
            nodes,
            edges: graph.edges().collect(),
        }
    }

    /// Canonical CBOR encoding (nodes and edges re-sorted first).
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut g = self.clone();
        g.nodes.sort_by(|a, b| a.code.cmp(&b.code));
        g.edges.sort();
        let mut bytes = Vec::new();
        into_writer(&g, &mut bytes).map_err(|e| ExportError::Encode(format!("{e:?}")))?;
        Ok(bytes)
    }

    /// BLAKE3 hash of the canonical form.
    pub fn compute_hash(&self) -> Result<Hash32, ExportError> {
        Ok(blake3::hash(&self.to_canonical_bytes()?).into())
    }

    /// Lowercase hex of [`Self::compute_hash`].
    pub fn fingerprint(&self) -> Result<String, ExportError> {
        Ok(blake3::Hash::from(self.compute_hash()?).to_hex().to_string())
    }
}

/// One row of the depth table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRow {
    /// Course code.
    pub course: CourseCode,
    /// Longest-path depth.
    pub depth: u32,
}

/// Flattens a depth map into rows ordered by code.
pub fn depth_rows(depths: &DepthMap) -> Vec<DepthRow> {
    depths
        .iter()
        .map(|(course, depth)| DepthRow {
            course: course.clone(),
            depth,
        })
        .collect()
}

/// One row of the filtered-pairs table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRow {
    /// Source course.
    pub course_a: CourseCode,
    /// Candidate course.
    pub course_b: CourseCode,
    /// Whether the pair passed the filter.
    pub kept: bool,
    /// Matching criterion when kept, exclusion reason otherwise.
    pub reason_or_criterion: String,
    /// `credits(b) - credits(a)` for pairs kept by the monotonic rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_delta: Option<u32>,
}

impl From<&FilterDecision> for FilterRow {
    fn from(d: &FilterDecision) -> Self {
        Self {
            course_a: d.pair.course_a.clone(),
            course_b: d.pair.course_b.clone(),
            kept: d.verdict.is_kept(),
            reason_or_criterion: d.verdict.to_string(),
            credit_delta: d.credit_delta(),
        }
    }
}

/// Flattens a filter report into rows, input order preserved.
pub fn filter_rows(report: &FilterReport) -> Vec<FilterRow> {
    report.decisions.iter().map(FilterRow::from).collect()
}
