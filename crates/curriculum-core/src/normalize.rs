// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Text normalisation port used to resolve recommendation fragments to courses.
use unicode_normalization::UnicodeNormalization;

/// Maps a course name (or recommendation fragment) to its lookup key.
///
/// Two strings that should resolve to the same course must normalise to the
/// same key. Richer implementations (stopword removal, lemmatisation) live
/// outside this crate; any `Fn(&str) -> String` can be plugged in.
pub trait TextNormalizer {
    /// Returns the normalised lookup key for `text`.
    fn normalize(&self, text: &str) -> String;
}

impl<F> TextNormalizer for F
where
    F: Fn(&str) -> String,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

/// Case and accent folding: NFKD, drop non-ASCII, collapse whitespace,
/// lowercase.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldingNormalizer;

impl TextNormalizer for FoldingNormalizer {
    fn normalize(&self, text: &str) -> String {
        let folded: String = text.nfkd().filter(char::is_ascii).collect();
        folded
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase()
    }
}
