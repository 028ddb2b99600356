//! Common building blocks shared across Lutem crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error taxonomy and classification
//! - `runtime`: async retry executor (tokio, tracing, jitter)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{ClassifiedError, ErrorClass, ErrorClassification, ErrorSeverity};
#[cfg(feature = "runtime")]
pub use resilience::{ExecuteOptions, Jitter, RetryExecutor, RetryPolicy};
