//! Snapshot batch writer
//!
//! Buffers completed records and persists them to numbered, write-once JSON files
//! of [`BATCH_SIZE`] records each. The final partial batch is flushed at shutdown
//! so no completed item is ever lost.

use super::record::Record;
use ohno::IntoAppError;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "  snapshot";

/// Number of records per snapshot file.
pub const BATCH_SIZE: usize = 100;

/// Information about a flushed batch, for checkpointing.
#[derive(Debug, Clone, Copy)]
pub struct FlushInfo {
    /// Index embedded in the flushed file's name.
    pub batch_index: u64,
    /// Identity id of the last record in the flushed batch.
    pub last_id: u64,
}

/// Batches completed records and persists them to numbered snapshot files.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    batch: Vec<Record>,
    next_index: u64,
}

/// Filename for the snapshot batch with the given index.
#[must_use]
pub fn batch_filename(index: u64) -> String {
    format!("recs-{index}.json")
}

impl SnapshotWriter {
    /// Create a writer over `dir`, numbering new batches from `next_index`.
    pub fn new(dir: impl Into<PathBuf>, next_index: u64) -> crate::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).into_app_err_with(|| format!("creating data directory '{}'", dir.display()))?;

        Ok(Self {
            dir,
            batch: Vec::with_capacity(BATCH_SIZE),
            next_index,
        })
    }

    /// Number of records buffered but not yet persisted.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Append a completed record, flushing a full batch to disk when one forms.
    ///
    /// Returns flush information when this append triggered a write.
    pub fn append(&mut self, record: Record) -> crate::Result<Option<FlushInfo>> {
        self.batch.push(record);

        if self.batch.len() == BATCH_SIZE {
            return self.write_batch().map(Some);
        }

        Ok(None)
    }

    /// Flush any remaining partial batch. Call once, at the end of the crawl.
    pub fn finish(&mut self) -> crate::Result<Option<FlushInfo>> {
        if self.batch.is_empty() {
            return Ok(None);
        }

        self.write_batch().map(Some)
    }

    /// Serialize the current batch to the next numbered file and clear the buffer.
    fn write_batch(&mut self) -> crate::Result<FlushInfo> {
        let index = self.next_index;
        let path = self.dir.join(batch_filename(index));

        // Files are write-once: a given index is never revisited, so an existing
        // file means the batch numbering is out of sync with the directory.
        let file = fs::File::create_new(&path)
            .into_app_err_with(|| format!("creating snapshot file '{}'", path.display()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, &self.batch)
            .into_app_err_with(|| format!("writing snapshot file '{}'", path.display()))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing snapshot file '{}'", path.display()))?;

        let last_id = self.batch.last().expect("batch is never flushed empty").id;
        log::info!(target: LOG_TARGET, "saved {} record(s) to {}", self.batch.len(), path.display());

        self.batch.clear();
        self.next_index += 1;

        Ok(FlushInfo { batch_index: index, last_id })
    }
}
