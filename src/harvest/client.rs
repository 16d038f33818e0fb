//! GitHub API client
//!
//! Minimal GitHub API client: one authenticated GET at a time, with each response
//! classified by status code and its rate limit headers extracted for pacing.

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LINK};
use std::sync::LazyLock;

const LOG_TARGET: &str = "    client";

/// Pattern to extract the `rel="next"` URL from a `Link` response header.
static NEXT_LINK_REGEX: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r#"<([^>]+)>;\s*rel="next""#).expect("invalid regex"));

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

/// Result of a single API call, classified by status code.
///
/// Every variant carries the rate limit snapshot from the response headers (when
/// present) so the caller can pace the next request off it.
pub enum ApiResult {
    /// HTTP 200 - the response body is ready to be consumed
    Success(reqwest::Response, Option<RateLimitInfo>),

    /// HTTP 202 - the server accepted the request and is computing the result
    Accepted(Option<RateLimitInfo>),

    /// HTTP 204 - the resource exists but has no data
    NoContent(Option<RateLimitInfo>),

    /// Transport failure or any other status code
    Failed(ohno::AppError, Option<RateLimitInfo>),
}

/// GitHub API client
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new API client with an optional authentication token
    pub fn new(token: Option<&str>, base_url: impl Into<String>) -> crate::Result<Self> {
        use reqwest::header::{AUTHORIZATION, HeaderValue};

        let mut client_builder = reqwest::Client::builder().user_agent("repo-census");

        if let Some(t) = token {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        Ok(Self {
            client: client_builder.build()?,
            base_url: base_url.into(),
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Make an API call and classify the result
    pub async fn api_call(&self, url: &str) -> ApiResult {
        let resp = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return ApiResult::Failed(e.into(), None),
        };

        // Extract rate limit info from response headers before checking status
        let rate_limit = extract_rate_limit_from_headers(resp.headers());

        let status = resp.status();
        if status == reqwest::StatusCode::ACCEPTED {
            return ApiResult::Accepted(rate_limit);
        }
        if status == reqwest::StatusCode::NO_CONTENT {
            return ApiResult::NoContent(rate_limit);
        }
        if status.is_success() {
            return ApiResult::Success(resp, rate_limit);
        }

        log::debug!(target: LOG_TARGET, "GET {url} returned {status}");
        let error = resp.error_for_status().expect_err("status is not successful at this point");
        ApiResult::Failed(error.into(), rate_limit)
    }
}

/// Extract rate limit information from API response headers
pub fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<u64>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

/// Extract the `rel="next"` continuation URL from a `Link` response header, if any.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    NEXT_LINK_REGEX.captures(link).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn extract_rate_limit() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));

        let rate_limit = extract_rate_limit_from_headers(&headers).unwrap();

        assert_eq!(rate_limit.remaining, 4999);
        assert_eq!(rate_limit.reset_at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn extract_rate_limit_missing_headers() {
        let headers = HeaderMap::new();
        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn extract_rate_limit_invalid_remaining() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("invalid"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));

        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn extract_rate_limit_invalid_reset() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("invalid"));

        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn next_link_present() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://api.github.com/repositories?since=9900>; rel="next", <https://api.github.com/repositories{?since}>; rel="first""#,
            ),
        );

        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://api.github.com/repositories?since=9900")
        );
    }

    #[test]
    fn next_link_absent() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(LINK, HeaderValue::from_static(r#"<https://api.github.com/x?page=1>; rel="prev""#));
        assert!(next_link(&headers).is_none());

        assert!(next_link(&HeaderMap::new()).is_none());
    }

    #[test]
    fn client_new_without_token() {
        let client = Client::new(None, "https://api.github.com").unwrap();
        assert_eq!(client.base_url(), "https://api.github.com");
    }

    #[test]
    fn client_new_with_token() {
        let client = Client::new(Some("test_token"), "https://api.github.com").unwrap();
        assert_eq!(client.base_url(), "https://api.github.com");
    }
}
