//! The `fetch` command

use super::common::{LogLevel, init_logging};
use crate::harvest::{Api, Client, Crawler, RatePacer, SnapshotWriter, resume};
use clap::Args;
use std::path::PathBuf;

const LOG_TARGET: &str = "     fetch";

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Arguments for the `fetch` command
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Directory snapshot batches are written to
    #[arg(long, short = 'd', value_name = "PATH", default_value = "data")]
    pub data_dir: PathBuf,

    /// Stop after this many completed records
    #[arg(long, short = 'l', value_name = "COUNT", default_value_t = 500)]
    pub limit: u64,

    /// Retry ceiling for statistics endpoints still computing on the server
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    pub max_retries: u32,

    /// Pick up where the previous crawl left off
    #[arg(long, short = 'a')]
    pub resume: bool,

    /// Base URL of the API (overridable for testing)
    #[arg(long, value_name = "URL", default_value = DEFAULT_BASE_URL, hide = true)]
    pub base_url: String,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

/// Crawl the repository collection and write snapshot batches.
pub async fn fetch_repositories(args: &FetchArgs) -> crate::Result<()> {
    init_logging(args.log_level);

    let (start_cursor, next_batch) = if args.resume {
        let point = resume::locate(&args.data_dir)?;
        log::info!(target: LOG_TARGET, "resuming at cursor {} with batch {}", point.cursor, point.next_batch);
        (point.cursor, point.next_batch)
    } else {
        (0, 1)
    };

    if args.github_token.is_none() {
        log::warn!(target: LOG_TARGET, "no token supplied; the unauthenticated rate budget is tiny");
    }

    let client = Client::new(args.github_token.as_deref(), &args.base_url)?;
    let api = Api::new(client, RatePacer, args.max_retries);
    let writer = SnapshotWriter::new(&args.data_dir, next_batch)?;

    let mut crawler = Crawler::new(api, writer, &args.data_dir, args.limit);
    let completed = crawler.run(start_cursor).await?;

    log::info!(target: LOG_TARGET, "crawl complete: {completed} record(s)");
    Ok(())
}
