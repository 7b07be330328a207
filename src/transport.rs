//! HTTP transport for the GitHub REST API.
//!
//! A [`Transport`] performs exactly one GET and reports the status, the
//! body and the `rel="next"` link of the response. Interpreting statuses is
//! left to the caller so that the same response can be fatal in one place
//! and merely recorded in another.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, QueryErrorKind};

/// Default base URL for the GitHub REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// REST API version sent with every request.
pub const API_VERSION: &str = "2022-11-28";

/// Items requested per page for paged listings.
pub const PER_PAGE: &str = "100";

/// One GET request, either built from an API path or taken verbatim from a
/// `Link` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Path relative to the base URL plus query parameters.
    Path {
        path: String,
        query: Vec<(String, String)>,
    },
    /// Absolute URL of a follow-up page.
    Next(String),
}

impl Request {
    /// Request for `path` without query parameters.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Add a query parameter. Ignored for [`Request::Next`], whose URL
    /// already carries its parameters.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        if let Self::Path { query, .. } = &mut self {
            query.push((key.to_string(), value.into()));
        }
        self
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path { path, query } => {
                f.write_str(path)?;
                for (i, (key, value)) in query.iter().enumerate() {
                    let sep = if i == 0 { '?' } else { '&' };
                    write!(f, "{sep}{key}={value}")?;
                }
                Ok(())
            }
            Self::Next(url) => f.write_str(url),
        }
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
    /// Target of the `rel="next"` link, if the server sent one.
    pub next: Option<String>,
}

/// GitHub's error body shape.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Response {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body, or classify the failure if the status is not 2xx.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, QueryErrorKind> {
        if !self.is_success() {
            return Err(self.failure());
        }
        serde_json::from_str(&self.body).map_err(|e| QueryErrorKind::MalformedRecord(e.to_string()))
    }

    /// Classify a non-success response: 4xx is a client error, anything
    /// else is a transport error.
    #[must_use]
    pub fn failure(&self) -> QueryErrorKind {
        let message = serde_json::from_str::<ErrorBody>(&self.body)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| self.body.trim().to_string());

        if (400..500).contains(&self.status) {
            QueryErrorKind::Client {
                status: self.status,
                message,
            }
        } else {
            QueryErrorKind::Transport {
                status: Some(self.status),
                message,
            }
        }
    }
}

/// Sends GET requests to the API.
///
/// `Err` is reserved for exchanges that produced no response at all
/// (timeouts, connection failures); HTTP error statuses come back as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &Request) -> Result<Response, QueryErrorKind>;
}

/// reqwest-backed transport with bearer authentication and a per-request timeout.
pub struct HttpTransport {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for API requests (e.g. <https://api.github.com>)
    /// * `token` - Personal access token sent as a bearer credential
    /// * `timeout` - Upper bound for each individual request
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, Error> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| Error::Configuration("token contains invalid characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghsearch/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, err: &reqwest::Error) -> QueryErrorKind {
        if err.is_timeout() {
            QueryErrorKind::Timeout(format!("no response within {}s", self.timeout.as_secs()))
        } else {
            QueryErrorKind::Transport {
                status: None,
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, request: &Request) -> Result<Response, QueryErrorKind> {
        let builder = match request {
            Request::Path { path, query } => self
                .client
                .get(format!("{}{}", self.base_url, path))
                .query(query),
            Request::Next(url) => self.client.get(url),
        };

        debug!(%request, "GET");

        let response = builder.send().await.map_err(|e| self.classify(&e))?;
        let status = response.status().as_u16();
        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);
        let body = response.text().await.map_err(|e| self.classify(&e))?;

        debug!(%request, status, has_next = next.is_some(), "response");

        Ok(Response { status, body, next })
    }
}

/// Extract the `rel="next"` target from a `Link` header.
///
/// `<https://api.github.com/x?page=2>; rel="next", <...>; rel="last"`
#[must_use]
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"').split_whitespace().any(|r| r == "next"))
                .unwrap_or(false)
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_next_link() {
        let header = r#"<https://api.github.com/orgs/acme/public_members?page=2>; rel="next", <https://api.github.com/orgs/acme/public_members?page=5>; rel="last""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://api.github.com/orgs/acme/public_members?page=2")
        );
    }

    #[test]
    fn test_parse_next_link_absent_on_last_page() {
        let header = r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=4>; rel="prev""#;
        assert_eq!(parse_next_link(header), None);
        assert_eq!(parse_next_link(""), None);
    }

    #[test]
    fn test_parse_next_link_order_independent() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=3>; rel="next""#;
        assert_eq!(
            parse_next_link(header).as_deref(),
            Some("https://api.github.com/x?page=3")
        );
    }

    #[test]
    fn test_request_display() {
        let request = Request::path("/users/octocat/repos")
            .query("type", "all")
            .query("per_page", PER_PAGE);
        assert_eq!(request.to_string(), "/users/octocat/repos?type=all&per_page=100");

        let next = Request::Next("https://api.github.com/x?page=2".to_string()).query("ignored", "1");
        assert_eq!(next.to_string(), "https://api.github.com/x?page=2");
    }

    #[test]
    fn test_failure_classification() {
        let not_found = Response {
            status: 404,
            body: r#"{"message":"Not Found","documentation_url":"https://docs.github.com"}"#.to_string(),
            next: None,
        };
        assert_eq!(
            not_found.failure(),
            QueryErrorKind::Client {
                status: 404,
                message: "Not Found".to_string()
            }
        );

        let bad_gateway = Response {
            status: 502,
            body: "upstream unavailable\n".to_string(),
            next: None,
        };
        assert_eq!(
            bad_gateway.failure(),
            QueryErrorKind::Transport {
                status: Some(502),
                message: "upstream unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_json_rejects_error_status() {
        let response = Response {
            status: 403,
            body: r#"{"message":"API rate limit exceeded"}"#.to_string(),
            next: None,
        };
        let result: Result<serde_json::Value, _> = response.json();
        assert_eq!(result.unwrap_err().status(), Some(403));
    }

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new("https://api.github.com/", "ghp_test", Duration::from_secs(5))
            .expect("transport creation should succeed");

        assert_eq!(transport.base_url(), "https://api.github.com");
        assert_eq!(transport.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_transport_rejects_unprintable_token() {
        let result = HttpTransport::new(DEFAULT_BASE_URL, "bad\ntoken", Duration::from_secs(5));
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
