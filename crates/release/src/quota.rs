//! Pre-call throttling based on the remaining API quota.
//!
//! Before every remote call the [`QuotaGuard`] reads the current quota. When
//! it is at or below the policy threshold the guard sleeps until the quota
//! resets and checks again. A failing quota check never blocks the call.

use crate::api::ForgeApi;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Remaining quota above which calls proceed immediately.
pub const DEFAULT_QUOTA_THRESHOLD: u32 = 100;

/// Delay used when the reported reset time is not in the future.
pub const DEFAULT_FALLBACK_DELAY: Duration = Duration::from_secs(15);

/// API quota as reported by the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    /// Calls left in the current window
    pub remaining: u32,
    /// When the window resets
    pub reset_at: DateTime<Utc>,
}

/// Throttling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaPolicy {
    /// Calls proceed without waiting while `remaining` exceeds this.
    pub threshold: u32,
    /// Seconds to wait when the reset time has already passed.
    #[serde(rename = "fallbackDelaySecs")]
    pub fallback_delay_secs: u64,
    /// Maximum number of consecutive waits; `None` waits for as long as it takes.
    #[serde(rename = "maxWaits")]
    pub max_waits: Option<u32>,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_QUOTA_THRESHOLD,
            fallback_delay_secs: DEFAULT_FALLBACK_DELAY.as_secs(),
            max_waits: None,
        }
    }
}

impl QuotaPolicy {
    /// How long to wait before calling, `None` to proceed now.
    ///
    /// Waits are rounded up to whole seconds since the remote reports reset
    /// times with second precision.
    #[must_use]
    pub fn delay_for(&self, state: &QuotaState, now: DateTime<Utc>) -> Option<Duration> {
        if state.remaining > self.threshold {
            return None;
        }

        let millis = (state.reset_at - now).num_milliseconds();
        if millis <= 0 {
            // A reset that already happened can still report a low quota for a while.
            return Some(Duration::from_secs(self.fallback_delay_secs));
        }

        let millis = u64::try_from(millis).unwrap_or(u64::MAX);
        Some(Duration::from_secs(millis.div_ceil(1000)))
    }
}

/// Blocks callers while the API quota is nearly exhausted.
#[derive(Debug, Clone, Default)]
pub struct QuotaGuard {
    policy: QuotaPolicy,
}

impl QuotaGuard {
    /// Creates a guard with the given policy.
    #[must_use]
    pub const fn new(policy: QuotaPolicy) -> Self {
        Self { policy }
    }

    /// The active policy.
    #[must_use]
    pub const fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Returns once a call may be issued.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `cancel` fires while checking or sleeping.
    pub async fn wait<A>(&self, api: &A, cancel: &CancellationToken) -> Result<()>
    where
        A: ForgeApi + ?Sized,
    {
        let mut waits = 0u32;
        loop {
            let state = tokio::select! {
                () = cancel.cancelled() => return Err(Error::Cancelled),
                state = api.rate_limit() => state,
            };
            let state = match state {
                Ok(state) => state,
                Err(err) => {
                    warn!(error = %err, "could not check rate limits, hoping for the best...");
                    return Ok(());
                }
            };

            let Some(delay) = self.policy.delay_for(&state, Utc::now()) else {
                return Ok(());
            };

            if self.policy.max_waits.is_some_and(|max| waits >= max) {
                warn!(
                    remaining = state.remaining,
                    waits, "still close to rate limiting, continuing anyway"
                );
                return Ok(());
            }

            warn!(
                remaining = state.remaining,
                sleep = ?delay,
                "token too close to rate limiting, sleeping before continuing..."
            );
            tokio::select! {
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
            waits += 1;
        }
    }
}
