//! Mock transport for testing.
//!
//! Provides a `MockTransport` that answers requests from canned responses
//! without touching the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::QueryErrorKind;
use crate::transport::{Request, Response, Transport};

/// Record of a request seen by the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The request as displayed, e.g. `/users/octocat/repos?type=all&per_page=100`
    pub request: String,
    /// Timestamp of the call
    pub timestamp: DateTime<Utc>,
}

impl MockCall {
    /// Create a new mock call record.
    pub fn new(request: &Request) -> Self {
        Self {
            request: request.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    outcome: Outcome,
}

#[derive(Debug, Clone)]
enum Outcome {
    Reply(Response),
    Fail(QueryErrorKind),
}

impl MockResponse {
    /// A `200 OK` carrying `body` as JSON.
    pub fn json(body: Value) -> Self {
        Self {
            outcome: Outcome::Reply(Response {
                status: 200,
                body: body.to_string(),
                next: None,
            }),
        }
    }

    /// A non-success status with a GitHub-style `{"message": ...}` body.
    pub fn status(status: u16, message: &str) -> Self {
        Self {
            outcome: Outcome::Reply(Response {
                status,
                body: serde_json::json!({ "message": message }).to_string(),
                next: None,
            }),
        }
    }

    /// A request that never got an answer.
    pub fn timeout() -> Self {
        Self {
            outcome: Outcome::Fail(QueryErrorKind::Timeout("mock timeout".to_string())),
        }
    }

    /// A request that could not connect.
    pub fn connection_error(message: &str) -> Self {
        Self {
            outcome: Outcome::Fail(QueryErrorKind::Transport {
                status: None,
                message: message.to_string(),
            }),
        }
    }

    /// Advertise a `rel="next"` link. The link is matched verbatim by the mock.
    #[must_use]
    pub fn with_next(mut self, next: &str) -> Self {
        if let Outcome::Reply(response) = &mut self.outcome {
            response.next = Some(next.to_string());
        }
        self
    }
}

/// Internal state for the mock transport.
#[derive(Default)]
struct MockTransportState {
    responses: HashMap<String, MockResponse>,
    calls: Vec<MockCall>,
}

/// Transport that serves canned responses.
///
/// A request is looked up first by its full display form (path plus query),
/// then by its path alone. Unknown requests answer `404 Not Found`.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockTransportState>>,
}

impl MockTransport {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the response for `key`.
    pub fn respond(&self, key: &str, response: MockResponse) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .responses
            .insert(key.to_string(), response);
    }

    /// Get recorded calls, optionally filtered by a substring of the request.
    pub fn get_calls(&self, filter: Option<&str>) -> Vec<MockCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .calls
            .iter()
            .filter(|c| filter.map_or(true, |f| c.request.contains(f)))
            .cloned()
            .collect()
    }

    /// Total number of requests seen.
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.len()
    }

    /// Check if a request containing `fragment` was made.
    pub fn was_called(&self, fragment: &str) -> bool {
        !self.get_calls(Some(fragment)).is_empty()
    }

    /// Reset all recorded calls.
    pub fn reset(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).calls.clear();
    }

    fn lookup(state: &MockTransportState, request: &Request) -> Option<MockResponse> {
        let full = request.to_string();
        if let Some(response) = state.responses.get(&full) {
            return Some(response.clone());
        }
        match request {
            Request::Path { path, .. } => state.responses.get(path).cloned(),
            Request::Next(_) => None,
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: &Request) -> Result<Response, QueryErrorKind> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(MockCall::new(request));

        match Self::lookup(&state, request) {
            Some(MockResponse {
                outcome: Outcome::Reply(response),
            }) => Ok(response),
            Some(MockResponse {
                outcome: Outcome::Fail(kind),
            }) => Err(kind),
            None => Ok(Response {
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_string(),
                next: None,
            }),
        }
    }
}
