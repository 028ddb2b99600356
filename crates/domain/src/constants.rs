//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Remote API defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

// Retry defaults (process-wide policy)
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 10_000;

// CSRF token handling
pub const CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
pub const CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";

// Caller identity forwarded to library endpoints
pub const USER_ID_HEADER: &str = "X-Firebase-UID";

// Persisted connection record
pub const DEFAULT_STATE_PATH: &str = "lutem-state.json";
pub const CONNECTION_NAMESPACE: &str = "lutem-steam";

// Classification
pub const NO_RESULT_REPORTED: &str = "no result reported";

/// Status codes with which the server rejects a classification precondition
/// (nothing connected, batch already running, AI backend not configured).
pub const CLASSIFICATION_PRECONDITION_STATUSES: [u16; 3] = [409, 412, 503];
