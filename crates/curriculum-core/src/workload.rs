// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structured workload (TPEI) components.
//!
//! Catalog data encodes the weekly hour split of a course in three textual
//! forms, all accepted by [`Workload::from_str`]:
//!
//! - dash form: `4-0-0-4` (theory, practice, extension, individual study)
//! - keyed form: `T:4,P:0,E:0,I:4`
//! - compact form: `T4 P0 E0 I4`
//!
//! Keyed and compact forms may omit components; missing ones default to 0.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hour counts for the four workload components of a course.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Workload {
    /// Theory hours.
    pub theory: u32,
    /// Practice hours.
    pub practice: u32,
    /// Extension hours.
    pub extension: u32,
    /// Individual-study hours.
    pub individual: u32,
}

impl Workload {
    /// Builds a workload from its four components.
    pub const fn new(theory: u32, practice: u32, extension: u32, individual: u32) -> Self {
        Self {
            theory,
            practice,
            extension,
            individual,
        }
    }

    /// Total credit count: theory plus practice hours.
    pub fn credits(&self) -> u32 {
        self.theory.saturating_add(self.practice)
    }

    /// Components in canonical `T, P, E, I` order.
    pub fn components(&self) -> [u32; 4] {
        [self.theory, self.practice, self.extension, self.individual]
    }

    /// Sum of absolute per-component differences, saturating at `u32::MAX`.
    pub fn distance(&self, other: &Self) -> u32 {
        self.components()
            .iter()
            .zip(other.components())
            .map(|(a, b)| a.abs_diff(b))
            .fold(0u32, u32::saturating_add)
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.theory, self.practice, self.extension, self.individual
        )
    }
}

/// Error returned when a workload string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkloadParseError {
    /// Input was empty.
    #[error("empty workload string")]
    Empty,
    /// Dash form did not have exactly four fields.
    #[error("expected 4 dash-separated components, found {0}")]
    FieldCount(usize),
    /// A component value was not a non-negative integer.
    #[error("invalid hour count {0:?}")]
    InvalidNumber(String),
    /// A keyed component used an unknown key.
    #[error("unknown workload component {0:?}")]
    UnknownKey(String),
}

impl FromStr for Workload {
    type Err = WorkloadParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(WorkloadParseError::Empty);
        }
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            parse_dashed(s)
        } else {
            parse_keyed(s)
        }
    }
}

fn parse_hours(raw: &str) -> Result<u32, WorkloadParseError> {
    raw.trim()
        .parse()
        .map_err(|_| WorkloadParseError::InvalidNumber(raw.trim().to_owned()))
}

fn parse_dashed(s: &str) -> Result<Workload, WorkloadParseError> {
    let fields: Vec<&str> = s.split('-').collect();
    let [t, p, e, i] = fields.as_slice() else {
        return Err(WorkloadParseError::FieldCount(fields.len()));
    };
    Ok(Workload::new(
        parse_hours(t)?,
        parse_hours(p)?,
        parse_hours(e)?,
        parse_hours(i)?,
    ))
}

fn parse_keyed(s: &str) -> Result<Workload, WorkloadParseError> {
    let mut workload = Workload::default();
    for token in s.split([',', ' ', ';']).filter(|t| !t.trim().is_empty()) {
        let token = token.trim();
        let (key, value) = match token.split_once(':') {
            Some((k, v)) => (k.trim(), v),
            None => token.split_at(token.chars().next().map_or(0, char::len_utf8)),
        };
        let hours = parse_hours(value)?;
        match key {
            "T" => workload.theory = hours,
            "P" => workload.practice = hours,
            "E" => workload.extension = hours,
            "I" => workload.individual = hours,
            other => return Err(WorkloadParseError::UnknownKey(other.to_owned())),
        }
    }
    Ok(workload)
}
