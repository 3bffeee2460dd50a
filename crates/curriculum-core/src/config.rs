// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scoring configuration and its storage port.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::builder::DEFAULT_DELIMITER;
use crate::credit::CreditPolicy;
use crate::scoring::{default_workers, PairMode};
use crate::similarity::{EmptyJaccard, SimilarityWeights};

/// Key under which [`ScoringConfig`] is stored.
pub const SCORING_CONFIG_KEY: &str = "scoring";

/// Number of neighbours ranked per course when none is configured.
pub const DEFAULT_TOP_K: usize = 5;

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A value parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Loads the stored [`ScoringConfig`], falling back to defaults, and validates it.
    pub fn load_scoring(&self) -> Result<ScoringConfig, ConfigError> {
        let config = self
            .load::<ScoringConfig>(SCORING_CONFIG_KEY)?
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }
}

const fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_owned()
}

/// Every tunable of the pipeline. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Signal weights.
    pub weights: SimilarityWeights,
    /// Jaccard value for two empty sets.
    pub empty_jaccard: EmptyJaccard,
    /// Neighbours kept per course by the ranker.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Pairs to score.
    pub pair_mode: PairMode,
    /// Scoring threads.
    pub workers: usize,
    /// Recommendation delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Credit-compatibility policy.
    pub credit_policy: CreditPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            empty_jaccard: EmptyJaccard::default(),
            top_k: DEFAULT_TOP_K,
            pair_mode: PairMode::default(),
            workers: default_workers(),
            delimiter: default_delimiter(),
            credit_policy: CreditPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// Rejects unusable weights, zero workers and an empty delimiter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.delimiter.is_empty() {
            return Err(ConfigError::Invalid("delimiter must not be empty".into()));
        }
        Ok(())
    }
}
