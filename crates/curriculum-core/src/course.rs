// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Course records and the catalog rows they are built from.
use serde::{Deserialize, Serialize};

use crate::ident::CourseCode;
use crate::workload::Workload;

/// A node of the curriculum graph.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Course {
    /// Unique course code.
    pub code: CourseCode,
    /// Display name as it appeared in the catalog.
    pub name: String,
    /// Structured TPEI workload, when the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workload: Option<Workload>,
}

impl Course {
    /// Creates a course with no workload information.
    pub fn new(code: CourseCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            workload: None,
        }
    }

    /// Total credit count derived from the workload, if known.
    pub fn credits(&self) -> Option<u32> {
        self.workload.as_ref().map(Workload::credits)
    }
}

/// One row of the external catalog table.
///
/// Every field is as loose as the upstream data: the code may be missing, the
/// recommendation list is free text.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct CatalogRow {
    /// Course code; rows without one are skipped.
    #[serde(default)]
    pub code: Option<String>,
    /// Course display name.
    #[serde(default)]
    pub name: String,
    /// Delimited list of recommended prerequisite course names.
    #[serde(default)]
    pub recommendation: Option<String>,
    /// Structured workload components.
    #[serde(default)]
    pub workload: Option<Workload>,
}

impl CatalogRow {
    /// Convenience constructor for a row with a code, name and recommendation text.
    pub fn new(code: &str, name: &str, recommendation: &str) -> Self {
        Self {
            code: Some(code.to_owned()),
            name: name.to_owned(),
            recommendation: Some(recommendation.to_owned()),
            workload: None,
        }
    }

    /// Attaches a workload to the row.
    pub fn with_workload(mut self, workload: Workload) -> Self {
        self.workload = Some(workload);
        self
    }
}
