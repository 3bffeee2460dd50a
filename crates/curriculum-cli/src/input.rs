// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON inputs and outputs.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curriculum_config_fs::FsConfigStore;
use curriculum_core::config::{ConfigService, ScoringConfig};
use curriculum_core::{CatalogRow, CourseCode, CoursePair, EmbeddingTable, Workload};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Workload as written in a catalog file: structured or TPEI text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkloadInput {
    Parts(Workload),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct CatalogInput {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    workload: Option<WorkloadInput>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
}

pub fn load_catalog(path: &Path) -> Result<Vec<CatalogRow>> {
    let rows: Vec<CatalogInput> = read_json(path)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            let workload = match row.workload {
                None => None,
                Some(WorkloadInput::Parts(w)) => Some(w),
                Some(WorkloadInput::Text(text)) => Some(
                    text.parse::<Workload>()
                        .with_context(|| format!("catalog row {i}: workload {text:?}"))?,
                ),
            };
            Ok(CatalogRow {
                code: row.code,
                name: row.name,
                recommendation: row.recommendation,
                workload,
            })
        })
        .collect()
}

pub fn load_embeddings(path: Option<&Path>) -> Result<EmbeddingTable> {
    let Some(path) = path else {
        return Ok(EmbeddingTable::new());
    };
    let map: BTreeMap<CourseCode, Vec<f32>> = read_json(path)?;
    EmbeddingTable::from_map(map).with_context(|| format!("embeddings in {}", path.display()))
}

pub fn load_pairs(path: &Path) -> Result<Vec<CoursePair>> {
    read_json(path)
}

/// Resolves the scoring config: explicit file, then config dir, then defaults.
pub fn load_config(file: Option<&Path>, dir: Option<&Path>) -> Result<ScoringConfig> {
    let config = match (file, dir) {
        (Some(file), _) => read_json::<ScoringConfig>(file)?,
        (None, Some(dir)) => {
            let store = FsConfigStore::with_base(dir)
                .with_context(|| format!("open config dir {}", dir.display()))?;
            return ConfigService::new(store)
                .load_scoring()
                .with_context(|| format!("load config from {}", dir.display()));
        }
        (None, None) => ScoringConfig::default(),
    };
    config.validate().context("validate config")?;
    Ok(config)
}

pub fn config_store(dir: Option<&Path>) -> Result<FsConfigStore> {
    match dir {
        Some(dir) => FsConfigStore::with_base(dir),
        None => FsConfigStore::new(),
    }
    .context("open config store")
}

pub fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
