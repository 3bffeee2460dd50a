// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Course identifiers.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a course in the catalog (e.g. `BCM0504-15`).
///
/// Codes are compared and ordered as plain strings; every ordered collection in
/// this crate is keyed by `CourseCode`, which is what makes outputs
/// independent of input row order.
///
/// Deserialising goes through [`CourseCode::new`], so codes read from JSON are
/// trimmed and blank codes are rejected.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Wraps a code after trimming surrounding whitespace.
    ///
    /// Returns `None` for empty (or whitespace-only) input, which is how the
    /// builder recognises rows without a usable code.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the code into its structured parts, if it follows the
    /// `AAAA0000-00` convention.
    pub fn parts(&self) -> Result<CourseCodeParts, CourseCodeError> {
        CourseCodeParts::parse(&self.0)
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseCodeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw).ok_or(CourseCodeError::Blank)
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.0
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Error returned for blank codes and for codes without the structured form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseCodeError {
    /// The code is empty or whitespace only.
    #[error("course code is blank")]
    Blank,
    /// The code is not of the form `AAAA0000-00`.
    #[error("course code {0:?} is not of the form AAAA0000-00")]
    Unstructured(String),
}

/// Structured components of a course code: area, number and catalog version.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CourseCodeParts {
    /// Three or four uppercase letters naming the area.
    pub area: String,
    /// Four-digit course number within the area.
    pub number: String,
    /// Two-digit catalog version suffix.
    pub version: String,
}

static CODE_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Z]{3,4})(\d{4})-(\d{2})$").ok());

impl CourseCodeParts {
    /// Parses `raw` into its parts.
    ///
    /// Codes that do not match are still valid course identities; they simply
    /// carry no structure.
    pub fn parse(raw: &str) -> Result<Self, CourseCodeError> {
        let unstructured = || CourseCodeError::Unstructured(raw.to_owned());
        let pattern = CODE_PATTERN.as_ref().ok_or_else(unstructured)?;
        let caps = pattern.captures(raw.trim()).ok_or_else(unstructured)?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_owned());
        match (group(1), group(2), group(3)) {
            (Some(area), Some(number), Some(version)) => Ok(Self {
                area,
                number,
                version,
            }),
            _ => Err(unstructured()),
        }
    }
}
