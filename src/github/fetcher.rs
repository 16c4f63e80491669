//! Contributor statistics fetching with retry.
//!
//! GitHub computes contributor statistics lazily: the first request for a
//! repository answers `202 Accepted` until a background job finishes. Combined
//! with rate limiting, a fetch may need many attempts. [`StatsFetcher`] runs an
//! explicit retry loop over an injected [`Clock`] and [`Sleeper`] so the loop
//! can be driven deterministically in tests. Organization listings go through
//! the same loop.

use super::client::GitHubApi;
use super::error::ApiError;
use crate::config::RetryConfig;
use crate::models::{ContributorStats, OrgRepository};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Suspends the current task between attempts.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How transient API conditions are retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait used when a rate-limit reset time has already passed.
    pub min_backoff: Duration,
    /// Wait between attempts while statistics are being computed.
    pub pending_delay: Duration,
    /// Total attempts allowed; `None` retries until the API answers.
    pub max_attempts: Option<u32>,
    /// Upper bound on a single rate-limit wait.
    pub max_wait: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_backoff: Duration::from_secs(5),
            pending_delay: Duration::from_secs(1),
            max_attempts: None,
            max_wait: None,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            min_backoff: Duration::from_secs(config.min_backoff_seconds.max(1)),
            pending_delay: Duration::from_secs(config.pending_delay_seconds),
            max_attempts: config.max_attempts.filter(|n| *n > 0),
            max_wait: config
                .max_wait_seconds
                .filter(|s| *s > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Time to wait before retrying a rate-limited request.
///
/// Never zero: a reset time at or before `now` yields `policy.min_backoff`.
pub fn rate_limit_wait(reset: DateTime<Utc>, now: DateTime<Utc>, policy: &RetryPolicy) -> Duration {
    let wait = (reset - now)
        .to_std()
        .ok()
        .filter(|d| !d.is_zero())
        .unwrap_or(policy.min_backoff);

    match policy.max_wait {
        Some(max) => wait.min(max),
        None => wait,
    }
}

/// Fetches contributor statistics and organization listings, retrying
/// rate-limit and pending responses.
pub struct StatsFetcher<'a, A, C = SystemClock, S = TokioSleeper> {
    api: &'a A,
    policy: RetryPolicy,
    clock: C,
    sleeper: S,
}

impl<'a, A: GitHubApi> StatsFetcher<'a, A> {
    /// Create a fetcher on the system clock and tokio timer.
    pub fn new(api: &'a A, policy: RetryPolicy) -> Self {
        Self::with_runtime(api, policy, SystemClock, TokioSleeper)
    }
}

impl<'a, A: GitHubApi, C: Clock, S: Sleeper> StatsFetcher<'a, A, C, S> {
    pub fn with_runtime(api: &'a A, policy: RetryPolicy, clock: C, sleeper: S) -> Self {
        Self {
            api,
            policy,
            clock,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch statistics for `owner/repo`.
    ///
    /// Rate-limit and pending answers are retried with the same request until
    /// data arrives, a terminal error occurs, or the attempt budget (if any)
    /// is spent.
    pub async fn fetch(&self, owner: &str, repo: &str) -> Result<Vec<ContributorStats>, ApiError> {
        let target = format!("{}/{}", owner, repo);
        let api = self.api;

        let stats = self
            .with_retry(&target, move || api.contributor_stats(owner, repo))
            .await?;

        debug!("Fetched {} contributors for {}", stats.len(), target);
        Ok(stats)
    }

    /// Fetch one page of an organization's public repositories, with the
    /// same retry behaviour as [`fetch`](Self::fetch).
    pub async fn list_org_page(
        &self,
        org: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<OrgRepository>, ApiError> {
        let target = format!("{} (page {})", org, page);
        let api = self.api;

        self.with_retry(&target, move || api.list_org_repos(org, page, per_page))
            .await
    }

    async fn with_retry<T, F, Fut>(&self, target: &str, mut call: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;

            let err = match call().await {
                Ok(value) => {
                    if attempts > 1 {
                        debug!("{} answered after {} attempts", target, attempts);
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if let Some(max) = self.policy.max_attempts {
                if attempts >= max {
                    warn!("Giving up on {} after {} attempts ({})", target, attempts, err);
                    return Err(ApiError::RetriesExhausted { attempts });
                }
            }

            let wait = match err {
                ApiError::RateLimited { reset } => {
                    let wait = rate_limit_wait(reset, self.clock.now(), &self.policy);
                    info!("Hit rate limit, waiting {:?}", wait);
                    wait
                }
                _ => {
                    debug!("{} is still being computed, retrying", target);
                    self.policy.pending_delay
                }
            };

            self.sleeper.sleep(wait).await;
        }
    }
}
