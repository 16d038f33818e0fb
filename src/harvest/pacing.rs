//! Rate budget pacing
//!
//! Spreads the shared API quota evenly across the time remaining until the quota
//! resets. Every call, of every kind, is followed by one paced sleep: the quota is
//! per-credential, so sub-fetches draw from the same budget as page fetches.

use super::client::RateLimitInfo;
use chrono::{DateTime, Utc};
use core::time::Duration;

const LOG_TARGET: &str = "    pacing";

/// Headroom multiplier applied to the even-spread delay.
const SAFETY_FACTOR: f64 = 1.1;

/// Computed delays below this floor are unreliable (clock skew, imminent reset).
const MIN_USABLE_DELAY: Duration = Duration::from_millis(100);

/// Substitute delay used whenever the computed delay can't be trusted.
const FALLBACK_DELAY: Duration = Duration::from_millis(500);

/// Computes a safe inter-request delay from the most recent response's rate limit headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RatePacer;

impl RatePacer {
    /// Compute the delay to sleep before the next request may be issued.
    ///
    /// The delay spreads the remaining quota evenly until the reset time, padded by
    /// [`SAFETY_FACTOR`]. With no usable rate information, an exhausted quota, or a
    /// computed delay below [`MIN_USABLE_DELAY`] (negative values included, which
    /// happen when the reset time has already passed), the result is the fixed
    /// [`FALLBACK_DELAY`] instead. The result is never negative and never zero.
    #[must_use]
    pub fn delay_after(&self, rate: Option<&RateLimitInfo>, now: DateTime<Utc>) -> Duration {
        let Some(rate) = rate else {
            return FALLBACK_DELAY;
        };

        if rate.remaining == 0 {
            return FALLBACK_DELAY;
        }

        #[expect(clippy::cast_precision_loss, reason = "acceptable for delay computation")]
        let delay = SAFETY_FACTOR * (rate.reset_at - now).num_seconds() as f64 / rate.remaining as f64;

        if delay < MIN_USABLE_DELAY.as_secs_f64() {
            FALLBACK_DELAY
        } else {
            Duration::from_secs_f64(delay)
        }
    }

    /// Sleep off the rate budget for the most recent response.
    pub async fn pace(&self, rate: Option<&RateLimitInfo>) {
        let delay = self.delay_after(rate, Utc::now());
        log::debug!(target: LOG_TARGET, "waiting {:.3}s", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}
