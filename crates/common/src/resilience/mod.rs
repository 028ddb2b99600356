//! Resilience patterns for remote calls
//!
//! - **Retry Logic**: capped exponential backoff with proportional jitter,
//!   per-call policy overrides and cooperative cancellation
//!
//! Retry decisions are delegated to the error type through
//! [`ErrorClassification`](crate::error::ErrorClassification), so the
//! executor stays generic while the request client plugs in
//! [`ClassifiedError`](crate::error::ClassifiedError).

pub mod retry;

// Re-export retry types
pub use retry::{
    Cancelled, ExecuteOptions, Jitter, RetryError, RetryExecutor, RetryOutcome, RetryPolicy,
    RetryPolicyBuilder, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
    MAX_JITTER_FRACTION,
};
