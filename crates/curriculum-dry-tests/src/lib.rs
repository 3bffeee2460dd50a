// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for curriculum crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`catalog`] - Catalog fixtures (diamond, cyclic, accented, synthetic layered)
//! - [`embeddings`] - Deterministic fake embedding providers

pub mod catalog;
pub mod config;
pub mod embeddings;

// Re-export commonly used items at crate root for convenience
pub use catalog::{
    accented_catalog, cyclic_catalog, diamond_catalog, layered_catalog, layered_code,
    layered_name,
};
pub use config::InMemoryConfigStore;
pub use embeddings::{embedding_table, HashEmbeddings, NoEmbeddings};
