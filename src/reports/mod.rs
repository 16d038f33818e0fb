//! Snapshot flattening and tabular output
//!
//! Reads the snapshot batches written by the harvester and emits one CSV row per
//! record, combining the stored identity fields with activity statistics derived
//! deterministically from the nested blocks.
//!
//! Rows come out in the order records are read from the snapshot files; the
//! cross-file ordering follows directory iteration order and is deliberately not
//! guaranteed.

mod csv;
mod loader;
mod reducer;
mod row;

pub use csv::generate;
pub use loader::load_records;
pub use reducer::reduce;
pub use row::{HEADER, Row};
