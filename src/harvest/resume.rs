//! Crawl resumption
//!
//! Recovers the cursor position and batch numbering of an interrupted crawl from
//! durable state in the data directory. The primary source is `checkpoint.json`,
//! written atomically after every batch flush; directories produced before the
//! checkpoint existed fall back to scanning the snapshot files themselves, keyed
//! by the numeric suffix in their names rather than filesystem timestamps.

use super::crawler::CURSOR_STRIDE;
use super::record::Record;
use super::snapshot::batch_filename;
use ohno::IntoAppError;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

const LOG_TARGET: &str = "    resume";

const CHECKPOINT_FILENAME: &str = "checkpoint.json";

/// Pattern to extract the batch index from a snapshot filename.
static BATCH_SUFFIX_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^recs-(\d+)\.json$").expect("invalid regex"));

/// Durable crawl position, written after every batch flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Checkpoint {
    /// Cursor to restart the collection walk from.
    pub cursor: u64,
    /// Index of the most recently written batch.
    pub batch_index: u64,
}

/// Where a resumed crawl should pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// Cursor to restart the collection walk from.
    pub cursor: u64,
    /// Index the next snapshot batch should be numbered with.
    pub next_batch: u64,
}

/// Atomically persist `checkpoint` into `dir`.
///
/// Written to a temporary file first and renamed into place, so a crash mid-write
/// leaves the previous checkpoint intact.
pub fn write_checkpoint(dir: &Path, checkpoint: &Checkpoint) -> crate::Result<()> {
    let path = dir.join(CHECKPOINT_FILENAME);
    let tmp_path = dir.join(format!("{CHECKPOINT_FILENAME}.tmp"));

    let body = serde_json::to_vec_pretty(checkpoint).into_app_err("serializing checkpoint")?;
    fs::write(&tmp_path, body).into_app_err_with(|| format!("writing checkpoint file '{}'", tmp_path.display()))?;
    fs::rename(&tmp_path, &path).into_app_err_with(|| format!("installing checkpoint file '{}'", path.display()))?;

    log::debug!(target: LOG_TARGET, "checkpoint: cursor {}, batch {}", checkpoint.cursor, checkpoint.batch_index);
    Ok(())
}

/// Recover the resume point for `dir`.
///
/// Prefers the durable checkpoint; falls back to loading the highest-numbered
/// snapshot batch and deriving the cursor from its last record's id. Fails when
/// the directory holds neither a checkpoint nor a parseable batch.
pub fn locate(dir: &Path) -> crate::Result<ResumePoint> {
    if let Some(checkpoint) = load_checkpoint(dir) {
        return Ok(ResumePoint {
            cursor: checkpoint.cursor,
            next_batch: checkpoint.batch_index + 1,
        });
    }

    let Some((index, path)) = newest_batch(dir)? else {
        return Err(ohno::app_err!("not resumable: no checkpoint or snapshot batches in '{}'", dir.display()));
    };

    let file = fs::File::open(&path).into_app_err_with(|| format!("opening snapshot file '{}'", path.display()))?;
    let batch: Vec<Record> = serde_json::from_reader(BufReader::new(file))
        .into_app_err_with(|| format!("parsing snapshot file '{}'", path.display()))?;

    let Some(last) = batch.last() else {
        return Err(ohno::app_err!("not resumable: snapshot file '{}' holds no records", path.display()));
    };

    log::debug!(target: LOG_TARGET, "resuming from batch {index}, last record {}", last.id);

    Ok(ResumePoint {
        cursor: last.id + CURSOR_STRIDE,
        next_batch: index + 1,
    })
}

/// Load and parse the checkpoint file, if one exists.
fn load_checkpoint(dir: &Path) -> Option<Checkpoint> {
    let path = dir.join(CHECKPOINT_FILENAME);
    let body = fs::read(&path).ok()?;

    match serde_json::from_slice(&body) {
        Ok(checkpoint) => Some(checkpoint),
        Err(e) => {
            log::warn!(target: LOG_TARGET, "ignoring unparseable checkpoint '{}': {e:#}", path.display());
            None
        }
    }
}

/// Find the snapshot batch with the highest numeric suffix.
fn newest_batch(dir: &Path) -> crate::Result<Option<(u64, std::path::PathBuf)>> {
    let entries = fs::read_dir(dir).into_app_err_with(|| format!("reading data directory '{}'", dir.display()))?;

    let mut newest: Option<u64> = None;
    for entry in entries {
        let entry = entry.into_app_err_with(|| format!("reading data directory '{}'", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(caps) = BATCH_SUFFIX_REGEX.captures(name)
            && let Ok(index) = caps[1].parse::<u64>()
        {
            newest = Some(newest.map_or(index, |n| n.max(index)));
        }
    }

    Ok(newest.map(|index| (index, dir.join(batch_filename(index)))))
}
