//! Capped exponential retry with proportional jitter
//!
//! A single logical call is attempted up to `max_attempts + 1` times, strictly
//! sequentially. Retry *n* (1-indexed) waits
//! `min(base_delay * 2^(n-1) * (1 + jitter), max_delay)` where `jitter` is
//! drawn uniformly from `[0, 0.3)`. Errors decide for themselves whether they
//! are worth retrying through [`ErrorClassification`].

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::error::{ClassifiedError, ErrorClassification};

/// Upper bound (exclusive) of the jitter fraction added to each delay.
pub const MAX_JITTER_FRACTION: f64 = 0.3;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default ceiling for any single retry delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(10_000);

/// Errors raised while building a retry policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    /// The retry policy configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Marker produced when a caller-supplied cancellation token fires.
///
/// Error types that can flow through [`RetryExecutor`] convert it into their
/// own representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl From<Cancelled> for ClassifiedError {
    fn from(_: Cancelled) -> Self {
        ClassifiedError::cancelled()
    }
}

/// Jitter applied on top of the exponential delay
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Jitter {
    /// No jitter
    None,
    /// Uniform fraction in `[0, 0.3)` drawn per retry
    #[default]
    Proportional,
    /// Fixed fraction, clamped to `[0, 0.3)`; used for deterministic delays
    Fixed(f64),
}

impl Jitter {
    /// Draw the jitter fraction for one retry.
    pub fn sample(&self) -> f64 {
        match self {
            Jitter::None => 0.0,
            Jitter::Proportional => rand::thread_rng().gen_range(0.0..MAX_JITTER_FRACTION),
            Jitter::Fixed(fraction) => {
                if fraction.is_finite() {
                    fraction.clamp(0.0, MAX_JITTER_FRACTION - f64::EPSILON)
                } else {
                    0.0
                }
            }
        }
    }
}

/// Retry policy: how many retries and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt (`0` disables retrying)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Ceiling applied to every delay, jitter included
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a validated policy.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::InvalidConfiguration`] when `max_delay` is
    /// shorter than `base_delay`.
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self, RetryError> {
        let policy = Self { max_attempts, base_delay, max_delay };
        policy.validate()?;
        Ok(policy)
    }

    /// A policy that performs exactly one attempt.
    pub fn no_retry() -> Self {
        Self { max_attempts: 0, ..Self::default() }
    }

    /// Create a configuration builder
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::InvalidConfiguration`] when `max_delay` is
    /// shorter than `base_delay`.
    pub fn validate(&self) -> Result<(), RetryError> {
        if self.max_delay < self.base_delay {
            return Err(RetryError::InvalidConfiguration {
                message: format!(
                    "max_delay ({:?}) must not be shorter than base_delay ({:?})",
                    self.max_delay, self.base_delay
                ),
            });
        }
        Ok(())
    }

    /// Total number of attempts a retryable failure will consume.
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }

    /// Effective delay before retry `retry` (1-indexed).
    ///
    /// Returns [`Duration::ZERO`] for `retry == 0`, which is the first
    /// attempt.
    pub fn delay_for(&self, retry: u32, jitter: &Jitter) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX).min(62);
        let secs = self.base_delay.as_secs_f64() * 2f64.powi(exponent) * (1.0 + jitter.sample());
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

/// Builder for [`RetryPolicy`] with fluent API
#[derive(Debug, Default)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.policy.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.policy.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    /// # Errors
    ///
    /// Returns [`RetryError::InvalidConfiguration`] for an invalid policy.
    pub fn build(self) -> Result<RetryPolicy, RetryError> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}

/// Per-call knobs for [`RetryExecutor::execute`]
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Overrides the executor's default policy for this call
    pub policy: Option<RetryPolicy>,
    /// Fail on the first error regardless of its class
    pub skip_retry: bool,
    /// Aborts the call before an attempt or while waiting/in flight
    pub cancel: Option<CancellationToken>,
}

impl ExecuteOptions {
    pub fn skip_retry() -> Self {
        Self { skip_retry: true, ..Self::default() }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Outcome of a retry execution including summary statistics.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, E>,
    /// Number of times the operation was invoked
    pub attempts: u32,
    /// Sum of all delays actually slept
    pub total_delay: Duration,
}

impl<T, E> RetryOutcome<T, E> {
    /// Consume the outcome and return only the result.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Runs an operation under a [`RetryPolicy`]
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    jitter: Jitter,
}

impl RetryExecutor {
    /// Create a new retry executor with the given default policy and jitter
    pub fn new(policy: RetryPolicy, jitter: Jitter) -> Self {
        Self { policy, jitter }
    }

    /// The process-wide default policy of this executor
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Execute an operation with retry logic
    ///
    /// The operation receives the 0-based attempt index.
    ///
    /// # Errors
    ///
    /// Returns the last observed error once retrying stops, or the error
    /// converted from [`Cancelled`] when the token fires.
    pub async fn execute<F, Fut, T, E>(&self, options: &ExecuteOptions, operation: F) -> Result<T, E>
    where
        E: ErrorClassification + fmt::Display + From<Cancelled>,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(options, operation).await.into_result()
    }

    /// Execute an operation with retry logic and return outcome statistics.
    #[instrument(skip_all, fields(skip_retry = options.skip_retry))]
    pub async fn execute_with_outcome<F, Fut, T, E>(
        &self,
        options: &ExecuteOptions,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        E: ErrorClassification + fmt::Display + From<Cancelled>,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let policy = options.policy.unwrap_or(self.policy);
        let cancel = options.cancel.as_ref();
        let mut attempt: u32 = 0;
        let mut total_delay = Duration::ZERO;
        let mut pending_delay = Duration::ZERO;

        loop {
            if !pending_delay.is_zero() {
                warn!(
                    attempt = attempt + 1,
                    total_attempts = policy.total_attempts(),
                    delay_ms = u64::try_from(pending_delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying after delay"
                );
                if !sleep_unless_cancelled(pending_delay, cancel).await {
                    debug!(attempt, "Cancelled while waiting to retry");
                    return RetryOutcome {
                        result: Err(Cancelled.into()),
                        attempts: attempt,
                        total_delay,
                    };
                }
                total_delay += pending_delay;
            }

            if cancel.is_some_and(CancellationToken::is_cancelled) {
                debug!(attempt, "Cancelled before attempt");
                return RetryOutcome { result: Err(Cancelled.into()), attempts: attempt, total_delay };
            }

            debug!(
                attempt = attempt + 1,
                total_attempts = policy.total_attempts(),
                "Executing operation"
            );

            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    () = token.cancelled() => Err(Cancelled.into()),
                    result = operation(attempt) => result,
                },
                None => operation(attempt).await,
            };
            let attempts = attempt + 1;

            match result {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "Operation succeeded after retrying");
                    }
                    return RetryOutcome { result: Ok(value), attempts, total_delay };
                }
                Err(error) => {
                    let final_attempt = attempt >= policy.max_attempts;
                    if options.skip_retry || !error.is_retryable() || final_attempt {
                        warn!(
                            attempts,
                            retryable = error.is_retryable(),
                            severity = %error.severity(),
                            error = %error,
                            "Operation failed, not retrying"
                        );
                        return RetryOutcome { result: Err(error), attempts, total_delay };
                    }

                    attempt += 1;
                    pending_delay = error
                        .retry_after()
                        .map_or_else(|| policy.delay_for(attempt, &self.jitter), |after| {
                            after.min(policy.max_delay)
                        });
                }
            }
        }
    }
}

/// Sleep for `delay`; returns `false` if the token fired first.
async fn sleep_unless_cancelled(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => false,
            () = tokio::time::sleep(delay) => true,
        },
        None => {
            tokio::time::sleep(delay).await;
            true
        }
    }
}
