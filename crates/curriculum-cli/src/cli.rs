// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "curriculum",
    author,
    version,
    about = "Course prerequisite graphs, similarity ranking and credit filtering"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build, score and rank a catalog; write every artefact as JSON
    Run(RunArgs),
    /// Print the top-K similar courses as a table
    Rank(RankArgs),
    /// Classify course pairs by credit compatibility
    Filter(FilterArgs),
    /// Show (and optionally save) the scoring config
    Config(ConfigArgs),
}

/// Config sources shared by the scoring commands.
#[derive(Args, Debug)]
pub struct ScoringArgs {
    /// Scoring config JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding `scoring.json` (ignored when --config is given)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// Override the number of scoring threads
    #[arg(long)]
    pub workers: Option<usize>,
    /// Override the number of neighbours per course
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Catalog JSON (array of rows)
    #[arg(long)]
    pub catalog: PathBuf,
    /// Embeddings JSON (map of course code to vector)
    #[arg(long)]
    pub embeddings: Option<PathBuf>,
    /// Output directory
    #[arg(long)]
    pub out: PathBuf,
    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Catalog JSON (array of rows)
    #[arg(long)]
    pub catalog: PathBuf,
    /// Embeddings JSON (map of course code to vector)
    #[arg(long)]
    pub embeddings: Option<PathBuf>,
    /// Rank only this course
    #[arg(long)]
    pub course: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Monotonic,
    Exact,
    Approximate,
}

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Pairs JSON (array of {course_a, course_b})
    #[arg(long)]
    pub pairs: PathBuf,
    /// Catalog JSON providing workloads
    #[arg(long)]
    pub catalog: PathBuf,
    /// Override the configured credit policy
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    /// Tolerance in hours for the approximate policy
    #[arg(long)]
    pub delta: Option<u32>,
    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config directory (defaults to the platform config dir)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
    /// Write the default config if none is stored yet
    #[arg(long)]
    pub save: bool,
}
