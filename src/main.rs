//! A tool to harvest repository metadata and activity statistics from the GitHub API.
//!
//! # Overview
//!
//! `repo-census` walks GitHub's paginated `/repositories` collection, fetching the
//! full profile plus contributor, participation, language, and code-frequency data
//! for each repository it encounters, and persists the assembled records as batched
//! JSON snapshot files. A second command flattens the accumulated snapshots into a
//! single CSV dataset suitable for analysis.
//!
//! # Basic Usage
//!
//! **Harvest 500 repositories into `data/`:**
//! ```bash
//! export GITHUB_TOKEN=ghp_xxxxxxxxxxxxxxxxxxxx
//! repo-census fetch --limit 500
//! ```
//!
//! **Pick up where a previous run left off:**
//! ```bash
//! repo-census fetch --resume
//! ```
//!
//! **Flatten the snapshots into a CSV file:**
//! ```bash
//! repo-census export --output repos.csv
//! ```
//!
//! # Rate Limits
//!
//! Every API response's `x-ratelimit-remaining` and `x-ratelimit-reset` headers feed
//! a pacing delay that is slept off before the next request, so the crawl spends the
//! hourly quota evenly instead of exhausting it and stalling. An unauthenticated
//! crawl is limited to 60 requests per hour; supply a token to raise that to 5000.

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};
use repo_census::Result;
use repo_census::commands::{ExportArgs, FetchArgs, export_snapshots, fetch_repositories};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-census", version, about)]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: CensusSubcommand,
}

#[derive(Subcommand, Debug)]
enum CensusSubcommand {
    /// Crawl the repository collection and write snapshot batches
    Fetch(FetchArgs),
    /// Flatten accumulated snapshots into a CSV dataset
    Export(ExportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command {
        CensusSubcommand::Fetch(args) => fetch_repositories(&args).await,
        CensusSubcommand::Export(args) => export_snapshots(&args),
    }
}
