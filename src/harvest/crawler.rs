//! Paginated repository crawler
//!
//! Walks the `/repositories` collection page by page, assembling one [`Record`]
//! per repository from a sequence of dependent sub-fetches. Page-level failures
//! are fatal and surface to the operator; per-item failures degrade to missing
//! fields or skipped items, because partial data beats losing the item.

use super::caller::Api;
use super::client::{ApiResult, next_link};
use super::record::{Contributor, Record, RepoProfile, RepoStub, distinct_lineage};
use super::resume::{Checkpoint, write_checkpoint};
use super::snapshot::{FlushInfo, SnapshotWriter};
use ohno::{EnrichableExt, IntoAppError};
use std::path::PathBuf;

const LOG_TARGET: &str = "   crawler";

/// Fixed cursor advance per collection page.
///
/// Matches the typical id density of one upstream page; if the collection's page
/// density ever changes, repositories could be silently skipped or revisited.
pub const CURSOR_STRIDE: u64 = 9900;

/// One decoded collection page.
struct Page {
    stubs: Vec<RepoStub>,
    next_cursor: u64,
}

/// Outcome of draining the contributors endpoint for one repository.
enum Contributors {
    /// All pages drained; contributors concatenated in delivery order.
    Collected(Vec<Contributor>),
    /// 204 on the first page: the repository has nothing worth recording.
    RepoEmpty,
    /// The endpoint failed part way; the field is omitted from the record.
    Unavailable,
}

/// Crawls the repository collection and persists completed records.
#[derive(Debug)]
pub struct Crawler {
    api: Api,
    writer: SnapshotWriter,
    data_dir: PathBuf,
    quota: u64,
}

impl Crawler {
    /// Create a crawler that stops after `quota` completed records.
    #[must_use]
    pub fn new(api: Api, writer: SnapshotWriter, data_dir: impl Into<PathBuf>, quota: u64) -> Self {
        Self {
            api,
            writer,
            data_dir: data_dir.into(),
            quota,
        }
    }

    /// Run the crawl from `start_cursor` until the quota is reached.
    ///
    /// Returns the number of records completed. Whatever happens, the pending
    /// partial batch is flushed before returning so completed items survive a
    /// fatal page failure.
    pub async fn run(&mut self, start_cursor: u64) -> crate::Result<u64> {
        let crawled = self.crawl(start_cursor).await;

        match (crawled, self.flush_remainder()) {
            (Ok(completed), Ok(())) => Ok(completed),
            (Ok(_), Err(e)) | (Err(e), Ok(())) => Err(e),
            (Err(e), Err(flush_err)) => {
                log::error!(target: LOG_TARGET, "could not flush final batch: {flush_err:#}");
                Err(e)
            }
        }
    }

    async fn crawl(&mut self, start_cursor: u64) -> crate::Result<u64> {
        if self.quota == 0 {
            return Ok(0);
        }

        let mut cursor = start_cursor;
        let mut completed = 0u64;

        'pages: loop {
            let page = self.fetch_page(cursor).await?;
            log::info!(target: LOG_TARGET, "page at cursor {cursor}: {} repositories", page.stubs.len());

            for stub in &page.stubs {
                if let Some(record) = self.harvest_repo(stub).await {
                    if let Some(info) = self.writer.append(record)? {
                        self.checkpoint(&info)?;
                    }

                    completed += 1;
                    if completed == self.quota {
                        break 'pages;
                    }
                }
            }

            cursor = page.next_cursor;
        }

        log::info!(target: LOG_TARGET, "quota of {} record(s) reached", self.quota);
        Ok(completed)
    }

    /// Fetch one collection page. Any failure here is fatal to the crawl.
    async fn fetch_page(&self, cursor: u64) -> crate::Result<Page> {
        let url = format!("{}/repositories?since={cursor}", self.api.base_url());

        match self.api.fetch(&url).await {
            ApiResult::Success(resp, _) => {
                let next = next_link(resp.headers())
                    .ok_or_else(|| ohno::app_err!("repository page at cursor {cursor} carries no continuation link"))?;

                // The upstream "next" link is only trusted for the cursor value it
                // embeds; the link itself doesn't advance through the collection at
                // the granularity this crawl wants.
                let next_cursor = since_param(&next)? + CURSOR_STRIDE;

                let stubs: Vec<RepoStub> = resp
                    .json()
                    .await
                    .into_app_err_with(|| format!("decoding repository page at cursor {cursor}"))?;

                Ok(Page { stubs, next_cursor })
            }
            ApiResult::Failed(e, _) => Err(e.enrich_with(|| format!("fetching repository page at cursor {cursor}"))),
            ApiResult::Accepted(_) | ApiResult::NoContent(_) => {
                Err(ohno::app_err!("unexpected response fetching repository page at cursor {cursor}"))
            }
        }
    }

    /// Assemble the record for one repository, or `None` when the item is skipped.
    async fn harvest_repo(&self, stub: &RepoStub) -> Option<Record> {
        let owner = &stub.owner.login;
        let name = &stub.name;
        log::info!(target: LOG_TARGET, "repository {owner}/{name}");

        let profile: RepoProfile = match self.api.fetch(&self.repo_url(owner, name, "")).await {
            ApiResult::Success(resp, _) => match resp.json().await {
                Ok(p) => p,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "could not decode profile for {owner}/{name}: {e:#}");
                    return None;
                }
            },
            ApiResult::Failed(e, _) => {
                log::warn!(target: LOG_TARGET, "could not fetch profile for {owner}/{name}: {e:#}");
                return None;
            }
            ApiResult::Accepted(_) | ApiResult::NoContent(_) => {
                log::warn!(target: LOG_TARGET, "unexpected response fetching profile for {owner}/{name}");
                return None;
            }
        };

        // A repository that has never seen a push isn't worth any further calls.
        if profile.pushed_at.is_none() {
            log::debug!(target: LOG_TARGET, "{owner}/{name} has never been pushed, moving on");
            return None;
        }

        let mut record = Record::from_profile(owner, name, &profile);

        match self.fetch_contributors(owner, name).await {
            Contributors::Collected(list) => record.contributors = Some(list),
            Contributors::RepoEmpty => {
                log::debug!(target: LOG_TARGET, "{owner}/{name} has no contributor data, moving on");
                return None;
            }
            Contributors::Unavailable => {}
        }

        record.participation = self.api.fetch_stat(&self.repo_url(owner, name, "/stats/participation")).await;
        record.languages = self.api.fetch_stat(&self.repo_url(owner, name, "/languages")).await;
        record.code_frequency = self.api.fetch_stat(&self.repo_url(owner, name, "/stats/code_frequency")).await;

        let (parent, source) = distinct_lineage(&profile);
        record.parent = parent;
        record.source = source;

        Some(record)
    }

    /// Drain every page of the contributors endpoint for one repository.
    ///
    /// This sub-pagination is independent of the collection cursor and must finish
    /// before the crawl moves on.
    async fn fetch_contributors(&self, owner: &str, name: &str) -> Contributors {
        let mut url = self.repo_url(owner, name, "/contributors");
        let mut all = Vec::new();
        let mut first_page = true;

        loop {
            match self.api.fetch(&url).await {
                ApiResult::Success(resp, _) => {
                    let next = next_link(resp.headers());

                    let page: Vec<Contributor> = match resp.json().await {
                        Ok(p) => p,
                        Err(e) => {
                            log::warn!(target: LOG_TARGET, "could not decode contributors for {owner}/{name}: {e:#}");
                            return Contributors::Unavailable;
                        }
                    };
                    all.extend(page);

                    match next {
                        Some(n) => url = n,
                        None => return Contributors::Collected(all),
                    }
                    first_page = false;
                }
                ApiResult::NoContent(_) if first_page => return Contributors::RepoEmpty,
                ApiResult::NoContent(_) => return Contributors::Collected(all),
                ApiResult::Accepted(_) => {
                    log::debug!(target: LOG_TARGET, "contributors for {owner}/{name} still computing, omitting");
                    return Contributors::Unavailable;
                }
                ApiResult::Failed(e, _) => {
                    log::warn!(target: LOG_TARGET, "could not fetch contributors for {owner}/{name}: {e:#}");
                    return Contributors::Unavailable;
                }
            }
        }
    }

    /// Write the durable checkpoint for a just-flushed batch.
    fn checkpoint(&self, info: &FlushInfo) -> crate::Result<()> {
        write_checkpoint(
            &self.data_dir,
            &Checkpoint {
                cursor: info.last_id + CURSOR_STRIDE,
                batch_index: info.batch_index,
            },
        )
    }

    /// Flush the pending partial batch and checkpoint it.
    fn flush_remainder(&mut self) -> crate::Result<()> {
        if let Some(info) = self.writer.finish()? {
            self.checkpoint(&info)?;
        }
        Ok(())
    }

    /// Construct the API URL for a repository with an optional path suffix
    fn repo_url(&self, owner: &str, name: &str, suffix: &str) -> String {
        format!("{}/repos/{owner}/{name}{suffix}", self.api.base_url())
    }
}

/// Extract the `since` cursor embedded in a continuation link.
fn since_param(link: &str) -> crate::Result<u64> {
    let url = url::Url::parse(link).into_app_err_with(|| format!("parsing continuation link '{link}'"))?;

    url.query_pairs()
        .find(|(k, _)| k == "since")
        .and_then(|(_, v)| v.parse().ok())
        .ok_or_else(|| ohno::app_err!("continuation link '{link}' carries no since cursor"))
}
