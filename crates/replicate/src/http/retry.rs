//! Retry policy for API requests

use http::Method;
use std::time::Duration;

/// Statuses retried by default.
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry behavior for a single endpoint.
///
/// # Default Configuration
///
/// - `max_retries`: 3
/// - `initial_delay`: 500ms
/// - `multiplier`: 2.0 (500ms, 1s, 2s)
/// - `max_delay`: 30s
/// - retried statuses: 429, 500, 502, 503, 504
/// - every method is eligible, POST included
///
/// Timeouts are never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    retry_statuses: Vec<u16>,
    retry_non_idempotent: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            retry_non_idempotent: true,
        }
    }
}

impl RetryPolicy {
    /// Create a new builder for configuring the retry policy.
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            policy: Self::default(),
        }
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Maximum number of retries after the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Statuses eligible for a retry.
    pub fn retry_statuses(&self) -> &[u16] {
        &self.retry_statuses
    }

    /// Whether a request with `method` may be retried at all.
    pub fn allows_method(&self, method: &Method) -> bool {
        self.retry_non_idempotent || method.is_idempotent()
    }

    /// Whether a response with `status` should be retried after `attempt` retries.
    ///
    /// 401, 403 and 422 are never retried even if listed.
    pub fn should_retry(&self, method: &Method, status: u16, attempt: u32) -> bool {
        if attempt >= self.max_retries || !self.allows_method(method) {
            return false;
        }
        if matches!(status, 401 | 403 | 422) {
            return false;
        }
        self.retry_statuses.contains(&status)
    }

    /// Delay before retry number `attempt` (zero-based).
    ///
    /// A server-provided `Retry-After` wins over the computed backoff; both are
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = match retry_after {
            Some(delay) => delay,
            None => {
                let factor = self.multiplier.powi(attempt as i32);
                self.initial_delay.mul_f64(factor)
            }
        };
        delay.min(self.max_delay)
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.policy.initial_delay = delay;
        self
    }

    /// Set the cap applied to every delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    /// Replace the set of retried statuses.
    pub fn retry_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.policy.retry_statuses = statuses.into();
        self
    }

    /// Whether POST and PATCH requests are retried. Enabled by default;
    /// pass `false` to restrict retries to idempotent methods.
    pub fn retry_non_idempotent(mut self, enabled: bool) -> Self {
        self.policy.retry_non_idempotent = enabled;
        self
    }

    /// Build the policy.
    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}
