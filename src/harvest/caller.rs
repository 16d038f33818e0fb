//! Retrying API caller
//!
//! Wraps the raw [`Client`] so that every call is followed by a paced sleep, and
//! polls through 202 "compute in progress" responses with linear backoff for the
//! statistics endpoints that are assembled asynchronously on the server.

use super::client::{ApiResult, Client};
use super::pacing::RatePacer;
use core::time::Duration;
use serde::de::DeserializeOwned;

const LOG_TARGET: &str = "    caller";

/// Backoff slept before retry number `retry` of a 202-polling sequence.
///
/// Linear and strictly increasing: 1s, 2s, 3s, ... Slept in addition to the
/// pacing delay, so a polling sequence never dips below the rate budget.
#[must_use]
pub const fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(retry as u64)
}

/// A paced, retrying view over the API client.
#[derive(Debug, Clone)]
pub struct Api {
    client: Client,
    pacer: RatePacer,
    max_retries: u32,
}

impl Api {
    /// Create a new paced caller around `client`.
    ///
    /// `max_retries` bounds how many 202 responses a single logical call polls
    /// through before giving up and reporting the data as unavailable.
    #[must_use]
    pub fn new(client: Client, pacer: RatePacer, max_retries: u32) -> Self {
        Self { client, pacer, max_retries }
    }

    /// Get the base URL of the underlying client
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Issue one GET and sleep off the rate budget before returning.
    ///
    /// The sleep runs whatever the outcome, because failed calls consume quota too.
    pub async fn fetch(&self, url: &str) -> ApiResult {
        let result = self.client.api_call(url).await;

        let rate = match &result {
            ApiResult::Success(_, rate)
            | ApiResult::Accepted(rate)
            | ApiResult::NoContent(rate)
            | ApiResult::Failed(_, rate) => *rate,
        };
        self.pacer.pace(rate.as_ref()).await;

        result
    }

    /// Fetch a statistics endpoint, polling through 202 responses.
    ///
    /// Returns `None` when the data is unavailable for this item: the retry ceiling
    /// was exhausted, the endpoint had no content, the body didn't parse, or the
    /// request failed outright. None of these abort the crawl.
    pub async fn fetch_stat<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let mut retry = 0u32;

        loop {
            match self.fetch(url).await {
                ApiResult::Success(resp, _) => match resp.json::<T>().await {
                    Ok(data) => return Some(data),
                    Err(e) => {
                        log::warn!(target: LOG_TARGET, "could not decode {url}: {e:#}");
                        return None;
                    }
                },
                ApiResult::Accepted(_) => {
                    retry += 1;
                    if retry > self.max_retries {
                        log::debug!(target: LOG_TARGET, "giving up on {url} after {} retries", self.max_retries);
                        return None;
                    }
                    log::debug!(target: LOG_TARGET, "202 Accepted for {url} (retry {retry})");
                    tokio::time::sleep(backoff_delay(retry)).await;
                }
                ApiResult::NoContent(_) => return None,
                ApiResult::Failed(e, _) => {
                    log::warn!(target: LOG_TARGET, "could not fetch {url}: {e:#}");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(3));
    }

    #[test]
    fn backoff_strictly_increases() {
        for retry in 1..10 {
            assert!(backoff_delay(retry + 1) > backoff_delay(retry));
        }
    }
}
