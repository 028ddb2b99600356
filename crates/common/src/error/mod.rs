//! Shared error taxonomy for remote calls
//!
//! Every outbound request in the client is funnelled through a single
//! resilient request client, and the only error that crosses that boundary is
//! [`ClassifiedError`]: a normalized `{status_code, status_text, body}` triple.
//! Retry decisions are derived from the status code alone, so the same
//! classification is shared by the retry executor, the domain call groups and
//! the library synchronization pipeline.
//!
//! # Error Classes
//!
//! | Class | Status codes | Retryable |
//! |-------|--------------|-----------|
//! | [`ErrorClass::Network`] | `0` (no response) | yes |
//! | [`ErrorClass::RateLimited`] | `429` | yes |
//! | [`ErrorClass::Server`] | `>= 500` | yes |
//! | [`ErrorClass::Client`] | every other non-success code | no |
//! | [`ErrorClass::Application`] | raised above the request client | no |
//!
//! Some failures never reach the wire but still need a status so callers can
//! classify them uniformly:
//!
//! - a request body that cannot be encoded is reported as `400 Invalid Request`
//! - a success body that cannot be decoded keeps its status with the text
//!   `Invalid Response Body`
//! - a caller-initiated cancellation is reported as `499 Client Closed Request`
//!
//! ## ErrorClassification Trait
//!
//! Higher-level error types implement [`ErrorClassification`] so that retry
//! logic, logging and user messaging can treat them uniformly:
//!
//! ```rust,ignore
//! use lutem_common::error::{ErrorClass, ErrorClassification, ErrorSeverity};
//!
//! impl ErrorClassification for PipelineError {
//!     fn class(&self) -> ErrorClass {
//!         match self {
//!             Self::Api(e) => e.class(),
//!             Self::NotConnected => ErrorClass::Application,
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Status code synthesized when no response was received at all.
pub const STATUS_NETWORK_ERROR: u16 = 0;

/// Status code synthesized when the caller cancelled the call.
pub const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

/// Broad class of a failure, used for retry and reporting decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// No response was received (connection refused, DNS, reset, ...)
    Network,
    /// The remote service throttled the caller (429)
    RateLimited,
    /// The remote service failed (5xx)
    Server,
    /// The request was rejected; retrying cannot fix it (4xx except 429)
    Client,
    /// Raised by higher-level code for conditions invisible to the transport
    Application,
}

impl ErrorClass {
    /// Classify a raw HTTP status code.
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            STATUS_NETWORK_ERROR => Self::Network,
            429 => Self::RateLimited,
            code if code >= 500 => Self::Server,
            _ => Self::Client,
        }
    }

    /// Whether errors of this class are worth retrying.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimited | Self::Server)
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network error"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::Server => write!(f, "server error"),
            Self::Client => write!(f, "client error"),
            Self::Application => write!(f, "application error"),
        }
    }
}

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// The taxonomy class of this error
    fn class(&self) -> ErrorClass;

    /// Check if this error is retryable
    ///
    /// Defaults to the retryability of [`ErrorClassification::class`].
    fn is_retryable(&self) -> bool {
        self.class().is_retryable()
    }

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity {
        match self.class() {
            ErrorClass::RateLimited | ErrorClass::Network => ErrorSeverity::Warning,
            ErrorClass::Server | ErrorClass::Client => ErrorSeverity::Error,
            ErrorClass::Application => ErrorSeverity::Info,
        }
    }

    /// Get the suggested retry delay if the error carries one
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Normalized error produced by the resilient request client.
///
/// Immutable once constructed. `status_code == 0` means no response was
/// received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    status_code: u16,
    status_text: String,
    body: Option<String>,
    /// Delay requested by the server, from a `Retry-After` header
    #[serde(skip)]
    retry_after: Option<Duration>,
}

impl ClassifiedError {
    /// Build an error from a response status, reason phrase and body.
    pub fn new(status_code: u16, status_text: impl Into<String>, body: Option<String>) -> Self {
        Self { status_code, status_text: status_text.into(), body, retry_after: None }
    }

    /// Attach the delay the server asked for before the next attempt.
    #[must_use]
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// Transport failure: no response was received.
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(STATUS_NETWORK_ERROR, "Network Error", Some(detail.into()))
    }

    /// The request could not be encoded and was never sent.
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Invalid Request", Some(detail.into()))
    }

    /// A success response whose body could not be decoded.
    pub fn invalid_response(status_code: u16, detail: impl Into<String>) -> Self {
        Self::new(status_code, "Invalid Response Body", Some(detail.into()))
    }

    /// The caller cancelled the call before it completed.
    pub fn cancelled() -> Self {
        Self::new(STATUS_CLIENT_CLOSED_REQUEST, "Client Closed Request", None)
    }

    /// HTTP status code, or `0` for transport failures.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Reason phrase associated with the status.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Raw response body, if any was captured.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Delay the server asked for, if it sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// True iff the status code is `0`, `429` or at least `500`.
    pub fn is_retryable(&self) -> bool {
        ErrorClass::from_status(self.status_code).is_retryable()
    }

    /// True when no response was received.
    pub fn is_network_error(&self) -> bool {
        self.status_code == STATUS_NETWORK_ERROR
    }

    /// True when the call was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        self.status_code == STATUS_CLIENT_CLOSED_REQUEST
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error: {} {}", self.status_code, self.status_text)
    }
}

impl std::error::Error for ClassifiedError {}

impl ErrorClassification for ClassifiedError {
    fn class(&self) -> ErrorClass {
        ErrorClass::from_status(self.status_code)
    }

    fn is_retryable(&self) -> bool {
        ClassifiedError::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ClassifiedError::retry_after(self)
    }
}
