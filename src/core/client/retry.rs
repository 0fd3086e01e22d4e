//! Retry policies and the per-call retry state machine.
//!
//! A [`RetryPolicy`] is two stored functions plus a budget:
//!
//! - `should_retry(attempt) -> bool`, consulted after every attempt;
//! - `backoff(n) -> Duration`, the wait after attempt `n` before attempt `n + 1`;
//! - `max_attempts >= 1`.
//!
//! [`RetryState`] applies a policy to one call. A 412 response stops the call
//! no matter what `should_retry` says.

use crate::core::client::utils::{exponential_backoff, is_transient_status};
use crate::core::error::{AttemptResult, ControlPlaneError, DEFAULT_TRANSIENT_STATUSES};
use crate::core::protocol::constants::headers;
use crate::core::protocol::precondition::is_precondition_failed;
use crate::core::types::WireResponse;
use std::sync::Arc;
use std::time::Duration;

/// Decision callback: `true` to try again.
pub type ShouldRetryFn = Arc<dyn Fn(&Attempt<'_>) -> bool + Send + Sync>;

/// Wait after the given 1-based attempt number.
pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// One finished attempt, as shown to `should_retry`.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    /// 1-based attempt number.
    pub number: u32,
    pub result: &'a AttemptResult,
}

impl<'a> Attempt<'a> {
    pub fn response(&self) -> Option<&'a WireResponse> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&'a ControlPlaneError> {
        self.result.as_ref().err()
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }
}

/// Retry behavior for a call.
///
/// Cheap to clone; the decision functions are shared.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    should_retry: ShouldRetryFn,
    backoff: BackoffFn,
    respect_retry_after: bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("respect_retry_after", &self.respect_retry_after)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    /// Three attempts, exponential backoff from 1s capped at 30s, retrying
    /// transport failures and [`DEFAULT_TRANSIENT_STATUSES`].
    fn default() -> Self {
        Self::exponential(3, Duration::from_secs(1), Duration::from_secs(30))
    }
}

impl RetryPolicy {
    /// Build a policy from its two decision functions. `max_attempts` is raised to 1 if 0.
    pub fn new<S, B>(max_attempts: u32, should_retry: S, backoff: B) -> Self
    where
        S: Fn(&Attempt<'_>) -> bool + Send + Sync + 'static,
        B: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self {
            max_attempts: max_attempts.max(1),
            should_retry: Arc::new(should_retry),
            backoff: Arc::new(backoff),
            respect_retry_after: false,
        }
    }

    /// Exactly one attempt.
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, |_| false, |_| Duration::ZERO)
    }

    /// Constant wait between attempts, default transient classification.
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(
            max_attempts,
            transient_classifier(DEFAULT_TRANSIENT_STATUSES),
            move |_| delay,
        )
        .with_respect_retry_after(true)
    }

    /// `base * 2^(n-1)` after attempt `n`, never more than `max`.
    #[must_use]
    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        Self::new(
            max_attempts,
            transient_classifier(DEFAULT_TRANSIENT_STATUSES),
            move |attempt| exponential_backoff(attempt.saturating_sub(1), base_ms).min(max),
        )
        .with_respect_retry_after(true)
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Replace the decision function.
    #[must_use]
    pub fn with_should_retry<F>(mut self, should_retry: F) -> Self
    where
        F: Fn(&Attempt<'_>) -> bool + Send + Sync + 'static,
    {
        self.should_retry = Arc::new(should_retry);
        self
    }

    #[must_use]
    pub fn with_backoff<F>(mut self, backoff: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Retry transport failures and exactly these statuses.
    #[must_use]
    pub fn with_transient_statuses(self, statuses: &[u16]) -> Self {
        self.with_should_retry(transient_classifier(statuses))
    }

    /// Wait at least as long as a `Retry-After` header asks.
    #[must_use]
    pub fn with_respect_retry_after(mut self, respect: bool) -> Self {
        self.respect_retry_after = respect;
        self
    }

    #[inline]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn should_retry(&self, attempt: &Attempt<'_>) -> bool {
        (self.should_retry)(attempt)
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    #[inline]
    pub fn respects_retry_after(&self) -> bool {
        self.respect_retry_after
    }
}

/// Decision function retrying transport failures and the given statuses.
///
/// Successful responses are never retried.
pub fn transient_classifier(statuses: &[u16]) -> impl Fn(&Attempt<'_>) -> bool + Send + Sync + 'static {
    let statuses: Arc<[u16]> = statuses.into();
    move |attempt| match attempt.result {
        Ok(response) => !response.is_success() && is_transient_status(response.status, &statuses),
        Err(err) => matches!(
            err,
            ControlPlaneError::Transport(_) | ControlPlaneError::Timeout | ControlPlaneError::Io(_)
        ),
    }
}

/// What the engine does after an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Wait, then send again.
    Retry(Duration),
    /// Surface the last result as-is.
    Stop,
    /// The policy wanted another attempt but the budget is spent.
    Exhausted,
}

/// Attempt counter for one call.
#[derive(Debug, Clone)]
pub struct RetryState<'p> {
    pub attempts: u32,
    policy: &'p RetryPolicy,
}

impl<'p> RetryState<'p> {
    pub fn new(policy: &'p RetryPolicy) -> Self {
        Self { attempts: 0, policy }
    }

    /// Record that an attempt is about to be sent; returns its number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Decide what follows the attempt that produced `result`.
    pub fn decide(&self, result: &AttemptResult) -> RetryDecision {
        if matches!(result, Ok(response) if is_precondition_failed(response)) {
            return RetryDecision::Stop;
        }

        let attempt = Attempt {
            number: self.attempts,
            result,
        };
        if !self.policy.should_retry(&attempt) {
            return RetryDecision::Stop;
        }
        if self.attempts >= self.policy.max_attempts() {
            return RetryDecision::Exhausted;
        }

        let mut wait = self.policy.backoff(self.attempts);
        if self.policy.respects_retry_after() {
            let retry_after = attempt
                .response()
                .and_then(|r| r.header(headers::RETRY_AFTER))
                .and_then(parse_retry_after);
            if let Some(retry_after) = retry_after {
                wait = wait.max(retry_after);
            }
        }
        RetryDecision::Retry(wait)
    }
}

/// `Retry-After` in delta-seconds form.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
