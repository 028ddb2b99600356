//! CSRF token source backed by the shared cookie jar
//!
//! The token is never cached: it is read from the jar on every mutating
//! attempt, so a rotated cookie is picked up by the next call. When the
//! server hands the token over in a response header instead (cross-origin
//! deployments where the cookie is scoped to another domain), the value is
//! written back into the jar rather than kept anywhere else.

use std::sync::Arc;

use lutem_domain::constants::{CSRF_COOKIE_NAME, CSRF_HEADER_NAME};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderMap;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct CsrfTokenSource {
    jar: Arc<Jar>,
}

impl CsrfTokenSource {
    pub fn new(jar: Arc<Jar>) -> Self {
        Self { jar }
    }

    /// Current token for `url`, percent-decoded; `None` when no cookie is set.
    pub fn token(&self, url: &Url) -> Option<String> {
        let cookies = self.jar.cookies(url)?;
        let cookies = cookies.to_str().ok()?;
        cookie_value(cookies, CSRF_COOKIE_NAME).map(decode)
    }

    /// Store a token delivered in a response header.
    pub fn capture(&self, url: &Url, headers: &HeaderMap) {
        let Some(token) = headers.get(CSRF_HEADER_NAME).and_then(|v| v.to_str().ok()) else {
            return;
        };
        if token.is_empty() {
            return;
        }
        if self.token(url).as_deref() == Some(token) {
            return;
        }
        debug!("Captured CSRF token from response header");
        let cookie = format!("{CSRF_COOKIE_NAME}={}; Path=/", urlencoding::encode(token));
        self.jar.add_cookie_str(&cookie, url);
    }
}

fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn url() -> Url {
        Url::parse("http://localhost:8080/api/steam/import").unwrap()
    }

    #[test]
    fn reads_and_decodes_cookie() {
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("session=abc; Path=/", &url());
        jar.add_cookie_str("XSRF-TOKEN=a%2Bb%3Dc; Path=/", &url());

        let source = CsrfTokenSource::new(jar);
        assert_eq!(source.token(&url()).as_deref(), Some("a+b=c"));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let jar = Arc::new(Jar::default());
        jar.add_cookie_str("session=abc; Path=/", &url());

        assert_eq!(CsrfTokenSource::new(jar).token(&url()), None);
    }

    #[test]
    fn captured_header_is_visible_to_next_read() {
        let source = CsrfTokenSource::new(Arc::new(Jar::default()));
        let mut headers = HeaderMap::new();
        headers.insert(CSRF_HEADER_NAME, HeaderValue::from_static("tok/en=1"));

        source.capture(&url(), &headers);

        let other_path = Url::parse("http://localhost:8080/admin/games/tag").unwrap();
        assert_eq!(source.token(&other_path).as_deref(), Some("tok/en=1"));
    }

    #[test]
    fn similar_cookie_names_do_not_match() {
        assert_eq!(cookie_value("MY-XSRF-TOKEN=1; XSRF-TOKEN=2", CSRF_COOKIE_NAME), Some("2"));
        assert_eq!(cookie_value("XSRF-TOKENX=1", CSRF_COOKIE_NAME), None);
    }
}
