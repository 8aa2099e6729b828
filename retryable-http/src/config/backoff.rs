use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use crate::config::cancel::CancelSignal;
use crate::error::Error;

/// Default retry configuration values.
pub mod defaults {
    use super::Strategy;
    use std::time::Duration;

    /// Default attempt budget.
    pub const ATTEMPTS: u32 = 10;

    /// Default base delay between attempts.
    pub const BASE_DELAY: Duration = Duration::from_secs(1);

    /// Default backoff strategy.
    pub const STRATEGY: Strategy = Strategy::Linear;
}

/// Upper bound on the attempt budget accepted by [`BackoffPolicy::validate`].
pub const MAX_ATTEMPTS: u32 = 100_000;

/// Delay progression between attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Constant delay: `base_delay` before every retry.
    #[default]
    Linear,
    /// Doubling delay: `base_delay * 2^(attempt - 1)` before retry `attempt`.
    Exponential,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Linear => "Linear",
            Strategy::Exponential => "Exponential",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parses a strategy name, case-insensitively. Unknown names are
    /// rejected with [`Error::InvalidConfig`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("linear") {
            Ok(Strategy::Linear)
        } else if s.eq_ignore_ascii_case("exponential") {
            Ok(Strategy::Exponential)
        } else {
            Err(Error::invalid_config(format!(
                "unknown backoff strategy: {}",
                s
            )))
        }
    }
}

/// Backoff configuration for the retry loop.
///
/// An attempt budget, a base delay and a [`Strategy`] that stretches the
/// delay between attempts. The first attempt is always immediate and no
/// delay follows the final failure.
///
/// # Example
///
/// ```
/// use retryable_http::{BackoffPolicy, Strategy};
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::new()
///     .attempts(5)
///     .base_delay(Duration::from_millis(250))
///     .strategy(Strategy::Exponential);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    /// Maximum number of attempts, counting the first one. `1..=100_000`.
    pub attempts: u32,
    /// Unit of backoff time.
    pub base_delay: Duration,
    /// Delay progression between attempts.
    pub strategy: Strategy,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            attempts: defaults::ATTEMPTS,
            base_delay: defaults::BASE_DELAY,
            strategy: defaults::STRATEGY,
        }
    }
}

impl BackoffPolicy {
    /// Create a policy with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that performs a single attempt and never retries.
    pub fn no_retry() -> Self {
        Self::new().attempts(1)
    }

    /// Quick doubling retries for latency-sensitive paths.
    pub fn aggressive() -> Self {
        Self::new()
            .attempts(5)
            .base_delay(Duration::from_millis(100))
            .strategy(Strategy::Exponential)
    }

    /// Slow constant retries for long-running background work.
    pub fn patient() -> Self {
        Self::new()
            .attempts(8)
            .base_delay(Duration::from_secs(2))
            .strategy(Strategy::Linear)
    }

    /// Set the attempt budget.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the base delay.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the delay strategy.
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.attempts == 0 {
            return Err("attempts must be at least 1");
        }
        if self.attempts > MAX_ATTEMPTS {
            return Err("attempts must not exceed 100000");
        }
        Ok(())
    }

    /// Delay to wait before attempt `attempt` (zero-based).
    ///
    /// Attempt 0 is immediate. Linear waits `base_delay` before every
    /// retry; Exponential waits `base_delay * 2^(attempt - 1)`. The
    /// arithmetic saturates instead of overflowing.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        match self.strategy {
            Strategy::Linear => self.base_delay,
            Strategy::Exponential => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt - 1)),
        }
    }
}

/// Run `attempt` under `policy` until it succeeds, the budget is spent, a
/// non-retryable error occurs, or `cancel` fires.
///
/// The attempt fn receives the zero-based attempt index. Attempts run
/// strictly sequentially. A retryable failure with budget remaining waits
/// [`BackoffPolicy::delay_before`] the next attempt, racing the delay
/// against `cancel`; a retryable failure on the final attempt returns
/// [`Error::Exhausted`] wrapping it, with no trailing delay. Non-retryable
/// errors are returned as-is.
///
/// The policy is validated before the first attempt; an invalid policy
/// returns [`Error::InvalidConfig`] without invoking `attempt`.
pub async fn run_with_backoff<F, Fut, T>(
    policy: &BackoffPolicy,
    cancel: &CancelSignal,
    mut attempt: F,
) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    policy.validate().map_err(Error::invalid_config)?;

    let mut attempt_index = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        match attempt(attempt_index).await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() => {
                let next = attempt_index + 1;
                if next >= policy.attempts {
                    return Err(Error::exhausted(policy.attempts, error));
                }

                let delay = policy.delay_before(next);
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    error = %error,
                    attempt = attempt_index,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after transient failure"
                );
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                attempt_index = next;
            }
            Err(error) => return Err(error),
        }
    }
}
