//! Repository metadata harvesting
//!
//! This module crawls the GitHub `/repositories` collection and assembles one
//! record per repository from several dependent sub-fetches, persisting completed
//! records as batched snapshot files.
//!
//! # Implementation Model
//!
//! The [`Crawler`] drives everything. Network access flows through [`Api`], which
//! pairs each call with a pacing sleep derived from the response's rate limit
//! headers ([`RatePacer`]) and polls through 202 "compute in progress" responses
//! with linear backoff. Completed records accumulate in the [`SnapshotWriter`]
//! until a full batch is flushed to a numbered, write-once JSON file; every flush
//! also writes a durable checkpoint that [`resume::locate`] uses to restart an
//! interrupted crawl without refetching completed work.
//!
//! Per-item failures degrade to missing fields or skipped items. Only failures at
//! the page level are fatal.

mod caller;
mod client;
mod crawler;
mod pacing;
pub mod record;
pub mod resume;
mod snapshot;

pub use caller::Api;
pub use client::{ApiResult, Client, RateLimitInfo};
pub use crawler::{CURSOR_STRIDE, Crawler};
pub use pacing::RatePacer;
pub use snapshot::{BATCH_SIZE, FlushInfo, SnapshotWriter};
