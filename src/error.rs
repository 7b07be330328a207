//! Error types for ghsearch.
//!
//! Two layers: [`QueryError`] describes one failed step of a query and is
//! either returned as the fatal error of an operation or collected into a
//! report's error list. [`Error`] covers everything that happens before a
//! query can start (configuration, HTTP client construction).

use serde::Serialize;
use thiserror::Error;

use crate::validate::InvalidIdentifier;

/// Main error type for the ghsearch crate.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(String),

    /// Missing or invalid configuration, including the credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A query failed outright
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// What went wrong in a single step of a query.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum QueryErrorKind {
    /// The caller supplied a name that cannot be a GitHub login.
    #[error("{0}")]
    InvalidIdentifier(String),

    /// 4xx from the API.
    #[error("HTTP {status}, please check that the name is spelled correctly: {message}")]
    Client { status: u16, message: String },

    /// Any other non-success status, or a connection failure (`status` is `None`).
    #[error("{}", transport_display(.status, .message))]
    Transport { status: Option<u16>, message: String },

    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A continuation page failed; items from earlier pages were kept.
    #[error("page {page} could not be fetched, results are incomplete: {cause}")]
    PartialPage { page: u32, cause: Box<QueryErrorKind> },

    /// A record did not have the expected shape.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
}

fn transport_display(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(status) => format!("returned error code {status}: {message}"),
        None => format!("connection failed: {message}"),
    }
}

impl QueryErrorKind {
    /// The HTTP status behind this failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } => Some(*status),
            Self::Transport { status, .. } => *status,
            Self::PartialPage { cause, .. } => cause.status(),
            Self::InvalidIdentifier(_) | Self::Timeout(_) | Self::MalformedRecord(_) => None,
        }
    }

    /// GitHub answers commit listings of a repository without any history
    /// with `409 Git Repository is empty.`
    #[must_use]
    pub fn is_empty_repository(&self) -> bool {
        matches!(
            self,
            Self::Client { status: 409, message } if message == "Git Repository is empty."
        )
    }

    /// Attach a context string.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> QueryError {
        QueryError {
            context: context.into(),
            kind: self,
        }
    }
}

/// A failed step of a query, with a description of what was being fetched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{context}: {kind}")]
pub struct QueryError {
    /// What was being fetched, e.g. "branches for repository octo/widgets".
    pub context: String,
    /// What went wrong.
    pub kind: QueryErrorKind,
}

impl QueryError {
    /// Create a new query error.
    pub fn new(context: impl Into<String>, kind: QueryErrorKind) -> Self {
        kind.context(context)
    }
}

impl From<InvalidIdentifier> for QueryError {
    fn from(err: InvalidIdentifier) -> Self {
        let context = format!("input '{}'", err.input());
        QueryErrorKind::InvalidIdentifier(err.to_string()).context(context)
    }
}
