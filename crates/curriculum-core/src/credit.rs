// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Credit-compatibility filtering of course pairs.
//!
//! One filter, three policies:
//!
//! - [`CreditPolicy::Monotonic`]: keep `(a, b)` iff `credits(a) <= credits(b)`;
//!   the credit delta `credits(b) - credits(a)` is reported on keep.
//! - [`CreditPolicy::Exact`]: keep iff all four workload components match.
//! - [`CreditPolicy::Approximate`]: rules tried in order, first match wins:
//!   exact, then redistribution (theory+practice sums within `delta` and both
//!   theory components positive), then approximate (sum of absolute component
//!   differences within `delta`); otherwise reject.
//!
//! A pair that names a course absent from the lookup table is always excluded
//! with a reason, never kept.
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::CurriculumGraph;
use crate::ident::CourseCode;
use crate::workload::Workload;

/// Tolerance used by [`CreditPolicy::Approximate`] when none is configured.
pub const DEFAULT_APPROXIMATE_DELTA: u32 = 10;

/// Course code to total credit count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreditTable(BTreeMap<CourseCode, u32>);

impl CreditTable {
    /// Derives credits (`theory + practice`) from a workload table.
    pub fn from_workloads(workloads: &WorkloadTable) -> Self {
        workloads.iter().map(|(c, w)| (c.clone(), w.credits())).collect()
    }

    /// Credits of `code`.
    pub fn get(&self, code: &CourseCode) -> Option<u32> {
        self.0.get(code).copied()
    }

    /// Sets the credits of `code`.
    pub fn insert(&mut self, code: CourseCode, credits: u32) {
        self.0.insert(code, credits);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CourseCode, u32)> for CreditTable {
    fn from_iter<T: IntoIterator<Item = (CourseCode, u32)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Course code to structured workload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadTable(BTreeMap<CourseCode, Workload>);

impl WorkloadTable {
    /// Collects the workloads carried by the graph's courses.
    pub fn from_graph(graph: &CurriculumGraph) -> Self {
        graph
            .courses()
            .filter_map(|c| Some((c.code.clone(), c.workload?)))
            .collect()
    }

    /// Workload of `code`.
    pub fn get(&self, code: &CourseCode) -> Option<&Workload> {
        self.0.get(code)
    }

    /// Sets the workload of `code`.
    pub fn insert(&mut self, code: CourseCode, workload: Workload) {
        self.0.insert(code, workload);
    }

    /// Iterates in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CourseCode, &Workload)> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CourseCode, Workload)> for WorkloadTable {
    fn from_iter<T: IntoIterator<Item = (CourseCode, Workload)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which compatibility rule set to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditPolicy {
    /// `credits(a) <= credits(b)`.
    #[default]
    Monotonic,
    /// All four workload components equal.
    Exact,
    /// Exact, then redistribution, then approximate, within `delta` hours.
    Approximate {
        /// Tolerance in hours.
        delta: u32,
    },
}

impl CreditPolicy {
    /// The approximate policy with [`DEFAULT_APPROXIMATE_DELTA`].
    pub const fn approximate() -> Self {
        Self::Approximate {
            delta: DEFAULT_APPROXIMATE_DELTA,
        }
    }
}

/// An ordered course pair to classify.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoursePair {
    /// Source course.
    pub course_a: CourseCode,
    /// Candidate course.
    pub course_b: CourseCode,
}

impl CoursePair {
    /// Builds a pair.
    pub fn new(course_a: CourseCode, course_b: CourseCode) -> Self {
        Self { course_a, course_b }
    }
}

/// Rule under which a pair was kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// `credits(a) <= credits(b)`; `delta = credits(b) - credits(a)`.
    Monotonic {
        /// Credit gain from `a` to `b`.
        delta: u32,
    },
    /// Identical workloads.
    ExactMatch,
    /// Same theory+practice total within tolerance, both with theory hours.
    Redistribution,
    /// Workloads within tolerance.
    Approximate {
        /// Sum of absolute component differences.
        distance: u32,
    },
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monotonic { delta } => write!(f, "credits(a) <= credits(b), delta {delta}"),
            Self::ExactMatch => f.write_str("exact match"),
            Self::Redistribution => f.write_str("redistribution"),
            Self::Approximate { distance } => write!(f, "approximate, distance {distance}"),
        }
    }
}

/// Why a pair was excluded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// A course is missing from the lookup table.
    CodeNotFound(CourseCode),
    /// `credits(a) > credits(b)`.
    CreditsExceed {
        /// Credits of `a`.
        credits_a: u32,
        /// Credits of `b`.
        credits_b: u32,
    },
    /// Workloads differ under the exact policy.
    WorkloadMismatch {
        /// Workload of `a`.
        workload_a: Workload,
        /// Workload of `b`.
        workload_b: Workload,
    },
    /// No approximate rule matched.
    OutsideTolerance {
        /// Sum of absolute component differences.
        distance: u32,
        /// Configured tolerance.
        delta: u32,
    },
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CodeNotFound(code) => write!(f, "code not found: {code}"),
            Self::CreditsExceed {
                credits_a,
                credits_b,
            } => write!(f, "credits(a) > credits(b): {credits_a} > {credits_b}"),
            Self::WorkloadMismatch {
                workload_a,
                workload_b,
            } => write!(f, "workload mismatch: {workload_a} vs {workload_b}"),
            Self::OutsideTolerance { distance, delta } => {
                write!(f, "outside tolerance: distance {distance} > delta {delta}")
            }
        }
    }
}

/// Outcome of classifying one pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The pair is compatible.
    Kept(Criterion),
    /// The pair is not compatible.
    Excluded(Exclusion),
}

impl Verdict {
    /// Returns `true` for [`Verdict::Kept`].
    pub fn is_kept(&self) -> bool {
        matches!(self, Self::Kept(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kept(c) => c.fmt(f),
            Self::Excluded(e) => e.fmt(f),
        }
    }
}

/// A classified pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterDecision {
    /// The pair.
    pub pair: CoursePair,
    /// Its classification.
    pub verdict: Verdict,
}

impl FilterDecision {
    /// Credit delta side output; set only for pairs kept by the monotonic rule.
    pub fn credit_delta(&self) -> Option<u32> {
        match self.verdict {
            Verdict::Kept(Criterion::Monotonic { delta }) => Some(delta),
            _ => None,
        }
    }
}

/// Decisions for a whole pair sequence, in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// One decision per input pair.
    pub decisions: Vec<FilterDecision>,
}

impl FilterReport {
    /// Number of kept pairs.
    pub fn kept(&self) -> usize {
        self.decisions.iter().filter(|d| d.verdict.is_kept()).count()
    }

    /// Number of excluded pairs.
    pub fn excluded(&self) -> usize {
        self.decisions.len() - self.kept()
    }
}

/// Pure classifier over fixed lookup tables.
#[derive(Clone, Copy, Debug)]
pub struct CreditFilter<'a> {
    policy: CreditPolicy,
    credits: &'a CreditTable,
    workloads: &'a WorkloadTable,
}

impl<'a> CreditFilter<'a> {
    /// Creates a filter. `credits` serves the monotonic policy, `workloads`
    /// the exact and approximate ones.
    pub fn new(policy: CreditPolicy, credits: &'a CreditTable, workloads: &'a WorkloadTable) -> Self {
        Self {
            policy,
            credits,
            workloads,
        }
    }

    /// Active policy.
    pub fn policy(&self) -> CreditPolicy {
        self.policy
    }

    /// Classifies one ordered pair.
    pub fn classify(&self, a: &CourseCode, b: &CourseCode) -> Verdict {
        match self.policy {
            CreditPolicy::Monotonic => self.monotonic(a, b),
            CreditPolicy::Exact => self.with_workloads(a, b, |wa, wb| {
                if wa == wb {
                    Verdict::Kept(Criterion::ExactMatch)
                } else {
                    Verdict::Excluded(Exclusion::WorkloadMismatch {
                        workload_a: *wa,
                        workload_b: *wb,
                    })
                }
            }),
            CreditPolicy::Approximate { delta } => {
                self.with_workloads(a, b, |wa, wb| approximate(wa, wb, delta))
            }
        }
    }

    /// Classifies every pair, preserving input order.
    pub fn apply(&self, pairs: &[CoursePair]) -> FilterReport {
        let decisions: Vec<FilterDecision> = pairs
            .iter()
            .map(|pair| FilterDecision {
                verdict: self.classify(&pair.course_a, &pair.course_b),
                pair: pair.clone(),
            })
            .collect();
        let report = FilterReport { decisions };
        debug!(
            policy = ?self.policy,
            kept = report.kept(),
            excluded = report.excluded(),
            "filtered course pairs"
        );
        report
    }

    fn monotonic(&self, a: &CourseCode, b: &CourseCode) -> Verdict {
        let (credits_a, credits_b) = match (self.credits.get(a), self.credits.get(b)) {
            (Some(x), Some(y)) => (x, y),
            (None, _) => return Verdict::Excluded(Exclusion::CodeNotFound(a.clone())),
            (_, None) => return Verdict::Excluded(Exclusion::CodeNotFound(b.clone())),
        };
        if credits_a <= credits_b {
            Verdict::Kept(Criterion::Monotonic {
                delta: credits_b - credits_a,
            })
        } else {
            Verdict::Excluded(Exclusion::CreditsExceed {
                credits_a,
                credits_b,
            })
        }
    }

    fn with_workloads(
        &self,
        a: &CourseCode,
        b: &CourseCode,
        rule: impl FnOnce(&Workload, &Workload) -> Verdict,
    ) -> Verdict {
        match (self.workloads.get(a), self.workloads.get(b)) {
            (Some(wa), Some(wb)) => rule(wa, wb),
            (None, _) => Verdict::Excluded(Exclusion::CodeNotFound(a.clone())),
            (_, None) => Verdict::Excluded(Exclusion::CodeNotFound(b.clone())),
        }
    }
}

fn approximate(a: &Workload, b: &Workload, delta: u32) -> Verdict {
    if a == b {
        return Verdict::Kept(Criterion::ExactMatch);
    }
    if a.credits().abs_diff(b.credits()) <= delta && a.theory > 0 && b.theory > 0 {
        return Verdict::Kept(Criterion::Redistribution);
    }
    let distance = a.distance(b);
    if distance <= delta {
        Verdict::Kept(Criterion::Approximate { distance })
    } else {
        Verdict::Excluded(Exclusion::OutsideTolerance { distance, delta })
    }
}
