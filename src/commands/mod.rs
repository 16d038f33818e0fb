//! Command-line interface and orchestration
//!
//! Two commands cover the tool's lifecycle: `fetch` crawls the repository
//! collection into snapshot batches (optionally resuming a previous run), and
//! `export` flattens the accumulated batches into a CSV dataset. The commands
//! share logging setup; everything else lives in [`crate::harvest`] and
//! [`crate::reports`].

mod common;
mod export;
mod fetch;

pub use common::LogLevel;
pub use export::{ExportArgs, export_snapshots};
pub use fetch::{FetchArgs, fetch_repositories};
