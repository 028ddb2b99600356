//! Request descriptors and per-call options

use lutem_common::resilience::{ExecuteOptions, RetryPolicy};
use reqwest::Method;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// A remote call: method, path, optional JSON body, extra headers and an
/// optional retry override. Built per call and never retained.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the client's base URL, starting with `/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// Per-call policy replacing the client default
    pub retry: Option<RetryPolicy>,
    encode_error: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            retry: None,
            encode_error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// A body that fails to serialize is remembered and reported by the
    /// client as an invalid request without anything being sent.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => {
                self.body = Some(value);
                self.encode_error = None;
            }
            Err(err) => self.encode_error = Some(err.to_string()),
        }
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter; encoding happens when the URL is built.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Whether the method changes server state and therefore carries the
    /// CSRF header.
    pub fn is_mutating(&self) -> bool {
        is_mutating(&self.method)
    }

    pub(crate) fn encode_error(&self) -> Option<&str> {
        self.encode_error.as_deref()
    }
}

pub(crate) fn is_mutating(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
}

/// Per-call knobs that are not part of the request itself
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Fail on the first error regardless of its class
    pub skip_retry: bool,
    /// Aborts the call before an attempt or while waiting/in flight
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn skip_retry() -> Self {
        Self { skip_retry: true, cancel: None }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn to_execute_options(&self, retry: Option<RetryPolicy>) -> ExecuteOptions {
        ExecuteOptions { policy: retry, skip_retry: self.skip_retry, cancel: self.cancel.clone() }
    }
}
