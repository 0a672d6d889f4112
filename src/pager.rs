//! Bounded paging over a search provider with rate-limit backoff.
//!
//! The pager pulls records one at a time from a [`SearchProvider`] and hands
//! them to the caller until the cap is reached or the provider stops.
//!
//! Policy:
//! - a rate-limit signal suspends the pager for [`RATE_LIMIT_COOLDOWN`] and
//!   then retries from the same position, without advancing the counter
//! - any other failure ends the sequence exactly like exhaustion does
//!
//! The second rule means a broken connection and a finished search look the
//! same to the caller. Only the logs (`warn!` versus `info!`) and
//! [`ResultPager::last_failure`] tell them apart.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::error::ProviderError;

/// Fixed pause after the provider reports a rate limit (15 minutes).
pub const RATE_LIMIT_COOLDOWN: std::time::Duration = std::time::Duration::from_secs(900);

/// One matched post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

/// Maximum number of records to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cap {
    Unbounded,
    Limit(u64),
}

impl Cap {
    /// Zero or negative counts mean unbounded.
    pub fn from_count(count: i64) -> Self {
        match u64::try_from(count) {
            Ok(0) | Err(_) => Cap::Unbounded,
            Ok(n) => Cap::Limit(n),
        }
    }

    fn is_reached(&self, emitted: u64) -> bool {
        match self {
            Cap::Unbounded => false,
            Cap::Limit(n) => emitted >= *n,
        }
    }
}

/// Upstream source of search results.
///
/// Implementations own their pagination cursors. `Ok(None)` means there is
/// nothing more to fetch.
#[allow(async_fn_in_trait)]
pub trait SearchProvider {
    async fn next_record(&mut self) -> Result<Option<ResultRecord>, ProviderError>;
}

/// Suspension point used for the rate-limit cooldown.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&mut self, duration: std::time::Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&mut self, duration: std::time::Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Fetching,
    BackingOff,
    Exhausted,
}

pub struct ResultPager<P, S = TokioSleeper> {
    provider: P,
    sleeper: S,
    cap: Cap,
    emitted: u64,
    state: PagerState,
    last_failure: Option<String>,
}

impl<P: SearchProvider> ResultPager<P, TokioSleeper> {
    pub fn new(provider: P, cap: Cap) -> Self {
        Self::with_sleeper(provider, cap, TokioSleeper)
    }
}

impl<P: SearchProvider, S: Sleeper> ResultPager<P, S> {
    pub fn with_sleeper(provider: P, cap: Cap, sleeper: S) -> Self {
        let state = if cap.is_reached(0) {
            PagerState::Exhausted
        } else {
            PagerState::Fetching
        };
        ResultPager {
            provider,
            sleeper,
            cap,
            emitted: 0,
            state,
            last_failure: None,
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    /// Number of records handed out so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// The failure that ended the sequence, if it did not end by exhaustion or cap.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Returns the next record, or `None` once the sequence has ended.
    ///
    /// Never returns an error: failures other than rate limiting end the
    /// sequence. After `None` every further call returns `None`.
    pub async fn next(&mut self) -> Option<ResultRecord> {
        loop {
            match self.state {
                PagerState::Exhausted => return None,
                PagerState::BackingOff => {
                    warn!(
                        "Rate limited by provider, sleeping for {} seconds before retrying",
                        RATE_LIMIT_COOLDOWN.as_secs()
                    );
                    self.sleeper.sleep(RATE_LIMIT_COOLDOWN).await;
                    info!("Rate-limit cooldown finished, resuming search");
                    self.state = PagerState::Fetching;
                }
                PagerState::Fetching => match self.provider.next_record().await {
                    Ok(Some(record)) => {
                        self.emitted += 1;
                        debug!("Emitting record {} ({})", self.emitted, record.timestamp);
                        if self.cap.is_reached(self.emitted) {
                            info!("Reached result cap of {} records", self.emitted);
                            self.state = PagerState::Exhausted;
                        }
                        return Some(record);
                    }
                    Ok(None) => {
                        info!(
                            "Search provider exhausted after {} records",
                            self.emitted
                        );
                        self.state = PagerState::Exhausted;
                    }
                    Err(e) if e.is_rate_limit() => {
                        self.state = PagerState::BackingOff;
                    }
                    Err(e) => {
                        warn!(
                            "Stopping search after {} records due to provider error: {}",
                            self.emitted, e
                        );
                        self.last_failure = Some(e.to_string());
                        self.state = PagerState::Exhausted;
                    }
                },
            }
        }
    }
}
