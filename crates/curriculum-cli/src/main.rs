// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! curriculum CLI
//!
//! JSON in, JSON out driver over `curriculum-core`. Logs go to stderr so
//! stdout stays machine readable.

mod cli;
mod commands;
mod input;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Run(args) => commands::run(args),
        Command::Rank(args) => commands::rank(args),
        Command::Filter(args) => commands::filter(args),
        Command::Config(args) => commands::config(args),
    }
}
