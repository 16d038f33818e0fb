//! Snapshot loading
//!
//! Reads every snapshot batch in a data directory back into records.

use crate::harvest::record::Record;
use ohno::IntoAppError;
use std::fs;
use std::io::BufReader;
use std::path::Path;

const LOG_TARGET: &str = "    loader";

/// Load the records from every snapshot batch in `dir`.
///
/// Records keep their in-file order; files come back in directory iteration
/// order, which is filesystem-dependent and deliberately not normalized.
pub fn load_records(dir: &Path) -> crate::Result<Vec<Record>> {
    let entries = fs::read_dir(dir).into_app_err_with(|| format!("reading data directory '{}'", dir.display()))?;

    let mut records = Vec::new();
    for entry in entries {
        let entry = entry.into_app_err_with(|| format!("reading data directory '{}'", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with("recs-") || !name.ends_with(".json") {
            continue;
        }

        let path = entry.path();
        log::debug!(target: LOG_TARGET, "loading {}", path.display());

        let file = fs::File::open(&path).into_app_err_with(|| format!("opening snapshot file '{}'", path.display()))?;
        let batch: Vec<Record> = serde_json::from_reader(BufReader::new(file))
            .into_app_err_with(|| format!("parsing snapshot file '{}'", path.display()))?;

        records.extend(batch);
    }

    Ok(records)
}
