// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fake embedding providers.

use curriculum_core::similarity::EmbeddingError;
use curriculum_core::{CourseCode, EmbeddingProvider, EmbeddingTable};

/// Deterministic pseudo-embeddings derived from the BLAKE3 hash of the code.
///
/// Components lie in `[-1, 1]`; the same code always maps to the same vector.
#[derive(Clone, Copy, Debug)]
pub struct HashEmbeddings {
    dimension: usize,
}

impl HashEmbeddings {
    /// Provider of `dimension`-length vectors (clamped to `1..=32`).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.clamp(1, 32),
        }
    }
}

impl EmbeddingProvider for HashEmbeddings {
    fn embedding(&self, code: &CourseCode) -> Option<Vec<f32>> {
        let hash = blake3::hash(code.as_str().as_bytes());
        Some(
            hash.as_bytes()
                .iter()
                .take(self.dimension)
                .map(|b| f32::from(*b) / 127.5 - 1.0)
                .collect(),
        )
    }
}

/// Provider that never has an embedding.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoEmbeddings;

impl EmbeddingProvider for NoEmbeddings {
    fn embedding(&self, _code: &CourseCode) -> Option<Vec<f32>> {
        None
    }
}

/// Builds a table from literal `(code, vector)` entries.
///
/// Entries with a blank code are left out; the first vector the table rejects
/// is returned as an error.
pub fn embedding_table(entries: &[(&str, &[f32])]) -> Result<EmbeddingTable, EmbeddingError> {
    let mut table = EmbeddingTable::new();
    for (code, vector) in entries {
        if let Some(code) = CourseCode::new(code) {
            table.insert(code, vector.to_vec())?;
        }
    }
    Ok(table)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_embeddings_are_stable_and_sized() {
        let provider = HashEmbeddings::new(8);
        let code = CourseCode::new("BCM0504-15").unwrap();
        let a = provider.embedding(&code).unwrap();
        assert_eq!(a.len(), 8);
        assert_eq!(provider.embedding(&code).unwrap(), a);
        assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn literal_table_skips_blank_codes() {
        let table = embedding_table(&[("A", &[1.0, 0.0]), ("", &[0.0, 1.0])]).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn literal_table_rejects_bad_vectors() {
        let err = embedding_table(&[("A", &[1.0, 0.0]), ("B", &[1.0])]).unwrap_err();
        assert!(matches!(err, EmbeddingError::DimensionMismatch { .. }));
    }
}
