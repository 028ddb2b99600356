use std::sync::Arc;
use std::time::Duration;

use lutem_common::error::ClassifiedError;
use lutem_common::resilience::{Jitter, RetryExecutor, RetryPolicy};
use lutem_domain::constants::{CSRF_HEADER_NAME, DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS};
use lutem_domain::{LutemConfig, LutemError, Result};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::csrf::CsrfTokenSource;
use super::request::{is_mutating, RequestDescriptor, RequestOptions};
use crate::config::retry_policy;
use crate::errors::{classify_transport_error, InfraError};

/// HTTP client with retry, backoff and CSRF handling.
///
/// The only way the application talks to the remote API. Every failure is
/// returned as a [`ClassifiedError`].
#[derive(Clone)]
pub struct ResilientClient {
    client: ReqwestClient,
    base_url: String,
    csrf: CsrfTokenSource,
    jar: Arc<Jar>,
    executor: RetryExecutor,
}

/// A request resolved against the base URL, ready to be sent any number of
/// times.
struct PreparedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ResilientClient {
    /// Start building a new client.
    pub fn builder() -> ResilientClientBuilder {
        ResilientClientBuilder::default()
    }

    /// Build a client from application configuration.
    ///
    /// # Errors
    /// Returns `LutemError::Config` for an invalid configuration.
    pub fn from_config(config: &LutemConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Self::builder()
            .base_url(&config.api.base_url)
            .timeout(config.api.timeout())
            .retry_policy(retry_policy(&config.retry)?);
        if let Some(agent) = &config.api.user_agent {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Process-wide default retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Cookie jar shared by every request of this client.
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    /// Execute `request` with the client's default options.
    ///
    /// # Errors
    /// See [`Self::execute`].
    pub async fn send<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<T, ClassifiedError> {
        self.execute(request, &RequestOptions::default()).await
    }

    /// Execute a request with retry semantics and decode its JSON response.
    ///
    /// Network failures, 429 and 5xx responses are retried with capped
    /// exponential backoff unless `options.skip_retry` is set. A `204` (or an
    /// empty success body) decodes as JSON `null`, so `()` and `Option<T>`
    /// accept it; other types fail with `204 No Content`, or with `Invalid
    /// Response Body` for any other status.
    ///
    /// # Errors
    /// Returns the last [`ClassifiedError`] once retrying stops:
    /// - status `0` for transport failures
    /// - the response status for non-success responses
    /// - `400 Invalid Request` when the request cannot be built (never sent)
    /// - `499` when `options.cancel` fires
    /// - the response status with `Invalid Response Body` when a success
    ///   body does not decode
    #[instrument(skip(self, request, options), fields(method = %request.method, path = %request.path))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        options: &RequestOptions,
    ) -> std::result::Result<T, ClassifiedError> {
        let prepared = self.prepare(request)?;
        let execute_options = options.to_execute_options(request.retry);

        let (status, body) = self
            .executor
            .execute(&execute_options, |attempt| self.attempt(&prepared, attempt))
            .await?;

        decode(status, &body)
    }

    /// Issue a single unretried GET and return the response status.
    ///
    /// # Errors
    /// Returns a network error when no response is received.
    #[instrument(skip(self))]
    pub async fn probe(&self, path: &str) -> std::result::Result<u16, ClassifiedError> {
        let url = self.resolve(path, &[])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| classify_transport_error(&err))?;
        Ok(response.status().as_u16())
    }

    fn prepare(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<PreparedRequest, ClassifiedError> {
        if let Some(err) = request.encode_error() {
            return Err(ClassifiedError::invalid_request(format!("body could not be encoded: {err}")));
        }

        let url = self.resolve(&request.path, &request.query)?;
        let headers = merge_headers(&request.headers)?;
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|err| ClassifiedError::invalid_request(err.to_string()))?;

        Ok(PreparedRequest { method: request.method.clone(), url, headers, body })
    }

    fn resolve(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> std::result::Result<Url, ClassifiedError> {
        let separator = if path.starts_with('/') { "" } else { "/" };
        let mut url = Url::parse(&format!("{}{separator}{path}", self.base_url))
            .map_err(|err| ClassifiedError::invalid_request(format!("invalid URL for {path}: {err}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn attempt(
        &self,
        request: &PreparedRequest,
        attempt: u32,
    ) -> std::result::Result<(StatusCode, Vec<u8>), ClassifiedError> {
        let method = &request.method;
        let url = &request.url;

        let mut headers = request.headers.clone();
        if is_mutating(method) {
            if let Some(token) = self.csrf.token(url) {
                match HeaderValue::from_str(&token) {
                    Ok(value) => {
                        headers.insert(HeaderName::from_static(CSRF_HEADER), value);
                    }
                    Err(_) => debug!("CSRF cookie is not a valid header value, omitting"),
                }
            }
        }
        debug!(
            attempt = attempt + 1,
            %method,
            %url,
            csrf = headers.contains_key(CSRF_HEADER),
            "sending HTTP request"
        );

        let mut builder = self.client.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|err| {
            debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");
            classify_transport_error(&err)
        })?;

        self.csrf.capture(url, response.headers());
        let status = response.status();
        debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

        if !status.is_success() {
            let text = status.canonical_reason().unwrap_or("Unknown Status");
            let retry_after = match status {
                StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
                    retry_after_delay(response.headers())
                }
                _ => None,
            };
            let body = response.text().await.ok().filter(|body| !body.is_empty());
            let error = ClassifiedError::new(status.as_u16(), text, body);
            return Err(match retry_after {
                Some(delay) => {
                    debug!(%status, delay_secs = delay.as_secs(), "server requested retry delay");
                    error.with_retry_after(delay)
                }
                None => error,
            });
        }

        let body = response.bytes().await.map_err(|err| classify_transport_error(&err))?;
        Ok((status, body.to_vec()))
    }
}

/// `Retry-After` in its delay-seconds form. HTTP-date values are ignored and
/// fall back to the retry policy's own backoff.
fn retry_after_delay(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Lower-cased `X-XSRF-TOKEN`, as `HeaderName::from_static` requires.
const CSRF_HEADER: &str = "x-xsrf-token";

/// Defaults first, caller headers on top. The CSRF header is reserved for
/// the token source and dropped if the caller supplies one.
fn merge_headers(extra: &[(String, String)]) -> std::result::Result<HeaderMap, ClassifiedError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| ClassifiedError::invalid_request(format!("invalid header name {name}: {err}")))?;
        if name.as_str().eq_ignore_ascii_case(CSRF_HEADER_NAME) {
            continue;
        }
        let value = HeaderValue::from_str(value)
            .map_err(|err| ClassifiedError::invalid_request(format!("invalid value for {name}: {err}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> std::result::Result<T, ClassifiedError> {
    if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
        const EMPTY: &str = "response type cannot be built from an empty body";
        return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
            if status == StatusCode::NO_CONTENT {
                ClassifiedError::new(status.as_u16(), "No Content", Some(EMPTY.to_string()))
            } else {
                ClassifiedError::invalid_response(status.as_u16(), EMPTY)
            }
        });
    }

    serde_json::from_slice(body)
        .map_err(|err| ClassifiedError::invalid_response(status.as_u16(), err.to_string()))
}

/// Builder for [`ResilientClient`].
#[derive(Debug)]
pub struct ResilientClientBuilder {
    base_url: String,
    timeout: Duration,
    policy: RetryPolicy,
    jitter: Jitter,
    user_agent: Option<String>,
    jar: Option<Arc<Jar>>,
}

impl Default for ResilientClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            policy: RetryPolicy::default(),
            jitter: Jitter::default(),
            user_agent: None,
            jar: None,
        }
    }
}

impl ResilientClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Transport timeout applied to every attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing cookie jar (credentials and the CSRF cookie).
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// # Errors
    /// Returns `LutemError::Config` for an unusable base URL or policy, or
    /// when the underlying HTTP client cannot be built.
    pub fn build(self) -> Result<ResilientClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|err| LutemError::Config(format!("Invalid API base URL {base_url}: {err}")))?;
        self.policy.validate().map_err(|err| LutemError::Config(err.to_string()))?;

        let jar = self.jar.unwrap_or_default();
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .cookie_provider(Arc::clone(&jar))
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            LutemError::from(infra)
        })?;

        Ok(ResilientClient {
            client,
            base_url,
            csrf: CsrfTokenSource::new(Arc::clone(&jar)),
            jar,
            executor: RetryExecutor::new(self.policy, self.jitter),
        })
    }
}
