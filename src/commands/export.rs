//! The `export` command

use super::common::{LogLevel, init_logging};
use crate::reports::{generate, load_records};
use clap::Args;
use ohno::IntoAppError;
use std::fs::File;
use std::io::{BufWriter, stdout};
use std::path::PathBuf;

const LOG_TARGET: &str = "    export";

/// Arguments for the `export` command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory holding the snapshot batches
    #[arg(long, short = 'd', value_name = "PATH", default_value = "data")]
    pub data_dir: PathBuf,

    /// Output CSV file (stdout when omitted)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,
}

/// Flatten the accumulated snapshots into a CSV dataset.
pub fn export_snapshots(args: &ExportArgs) -> crate::Result<()> {
    init_logging(args.log_level);

    let records = load_records(&args.data_dir)?;
    log::info!(target: LOG_TARGET, "flattening {} record(s)", records.len());

    match &args.output {
        Some(path) => {
            let file = File::create(path).into_app_err_with(|| format!("creating output file '{}'", path.display()))?;
            generate(&records, BufWriter::new(file))
        }
        None => generate(&records, stdout().lock()),
    }
}
