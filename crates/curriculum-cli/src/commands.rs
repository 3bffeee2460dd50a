// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Subcommand implementations.

use std::fs;
use std::io::Write;

use anyhow::{bail, Context, Result};
use comfy_table::Table;
use curriculum_core::config::{ConfigService, ConfigStore, SCORING_CONFIG_KEY};
use curriculum_core::export::{depth_rows, filter_rows, GraphExport};
use curriculum_core::{
    rank_all, top_k, CourseCode, CreditPolicy, CreditTable, Pipeline, Ranking, ScoringConfig,
    WorkloadTable,
};
use serde::Serialize;
use tracing::info;

use crate::cli::{ConfigArgs, FilterArgs, PolicyArg, RankArgs, RunArgs, ScoringArgs};
use crate::input::{
    config_store, load_catalog, load_config, load_embeddings, load_pairs, print_json, write_json,
};

#[derive(Serialize)]
struct RunSummary {
    courses: usize,
    edges: usize,
    removed_edges: usize,
    skipped_rows: usize,
    unresolved_fragments: usize,
    pairs: usize,
    graph_hash: String,
}

fn scoring_config(args: &ScoringArgs) -> Result<ScoringConfig> {
    let mut config = load_config(args.config.as_deref(), args.config_dir.as_deref())?;
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(k) = args.top_k {
        config.top_k = k;
    }
    config.validate().context("validate config")?;
    Ok(config)
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = scoring_config(&args.scoring)?;
    let rows = load_catalog(&args.catalog)?;
    let embeddings = load_embeddings(args.embeddings.as_deref())?;
    let out = Pipeline::new(config).run(&rows, &embeddings)?;

    fs::create_dir_all(&args.out).with_context(|| format!("create {}", args.out.display()))?;
    let graph = GraphExport::new(&out.graph, Some(&out.depths));
    write_json(&args.out, "graph.json", &graph)?;
    write_json(&args.out, "depths.json", &depth_rows(&out.depths))?;
    write_json(&args.out, "metrics.json", &out.centrality)?;
    write_json(&args.out, "similarities.json", &out.similarities)?;
    write_json(&args.out, "rankings.json", &out.rankings)?;
    write_json(&args.out, "removed_edges.json", &out.removed_edges)?;
    write_json(&args.out, "build_report.json", &out.build_report)?;
    info!(out = %args.out.display(), "wrote pipeline outputs");

    print_json(&RunSummary {
        courses: out.graph.node_count(),
        edges: out.graph.edge_count(),
        removed_edges: out.removed_edges.len(),
        skipped_rows: out.build_report.skipped_rows.len(),
        unresolved_fragments: out.build_report.unresolved.len(),
        pairs: out.similarities.len(),
        graph_hash: graph.fingerprint()?,
    })
}

pub fn rank(args: &RankArgs) -> Result<()> {
    let config = scoring_config(&args.scoring)?;
    let k = config.top_k;
    let rows = load_catalog(&args.catalog)?;
    let embeddings = load_embeddings(args.embeddings.as_deref())?;
    let out = Pipeline::new(config).run(&rows, &embeddings)?;

    let rankings: Vec<Ranking> = match &args.course {
        Some(raw) => {
            let Some(code) = CourseCode::new(raw).filter(|c| out.graph.contains(c)) else {
                bail!("unknown course {raw:?}");
            };
            top_k(&code, &out.similarities, k)
        }
        None => rank_all(&out.similarities, k),
    };

    if args.json {
        return print_json(&rankings);
    }
    let mut table = Table::new();
    table.set_header(vec!["course", "similar_course", "score"]);
    for r in &rankings {
        table.add_row(vec![
            r.course.to_string(),
            r.similar_course.to_string(),
            format!("{:.4}", r.score),
        ]);
    }
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{table}")?;
    Ok(())
}

pub fn filter(args: &FilterArgs) -> Result<()> {
    let mut config = scoring_config(&args.scoring)?;
    if let Some(policy) = args.policy {
        config.credit_policy = match policy {
            PolicyArg::Monotonic => CreditPolicy::Monotonic,
            PolicyArg::Exact => CreditPolicy::Exact,
            PolicyArg::Approximate => CreditPolicy::Approximate {
                delta: args.delta.unwrap_or(curriculum_core::credit::DEFAULT_APPROXIMATE_DELTA),
            },
        };
    } else if let (Some(delta), CreditPolicy::Approximate { .. }) = (args.delta, config.credit_policy)
    {
        config.credit_policy = CreditPolicy::Approximate { delta };
    }

    let rows = load_catalog(&args.catalog)?;
    let pairs = load_pairs(&args.pairs)?;
    let workloads: WorkloadTable = rows
        .iter()
        .filter_map(|row| Some((CourseCode::new(row.code.as_deref()?)?, row.workload?)))
        .collect();
    let credits = CreditTable::from_workloads(&workloads);
    let report = Pipeline::new(config).filter(&pairs, &credits, &workloads);
    info!(kept = report.kept(), excluded = report.excluded(), "filtered pairs");
    print_json(&filter_rows(&report))
}

pub fn config(args: &ConfigArgs) -> Result<()> {
    let store = config_store(args.config_dir.as_deref())?;
    let dir = store.base().display().to_string();
    let exists = match store.load_raw(SCORING_CONFIG_KEY) {
        Ok(_) => true,
        Err(curriculum_core::ConfigError::NotFound) => false,
        Err(e) => return Err(e).context("read stored config"),
    };
    let service = ConfigService::new(store);
    if args.save && !exists {
        service
            .save(SCORING_CONFIG_KEY, &ScoringConfig::default())
            .context("save default config")?;
        info!(%dir, "wrote default config");
    }
    let config = service.load_scoring().context("load config")?;
    print_json(&config)
}
