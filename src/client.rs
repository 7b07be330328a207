//! ghsearch main client.
//!
//! Provides the primary interface for querying the GitHub API.

use std::sync::Arc;
use std::time::Duration;

use crate::clients::{ContributionsClient, OrgsClient, UsersClient};
use crate::error::Error;
use crate::transport::{HttpTransport, Transport, DEFAULT_BASE_URL};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Main client for querying the GitHub API.
///
/// Aggregates the resource clients over one shared transport.
///
/// # Example
///
/// ```rust,ignore
/// use ghsearch::GitHubClient;
///
/// let client = GitHubClient::new(&token, None, None)?;
///
/// let members = client.orgs().list_members("rust-lang").await?;
/// let octocat = client.users().resolve("octocat").await?;
/// let activity = client.contributions().list_repo_contributions("octocat").await?;
/// ```
pub struct GitHubClient {
    transport: Arc<dyn Transport>,
    users: UsersClient,
    orgs: OrgsClient,
    contributions: ContributionsClient,
}

impl GitHubClient {
    /// Create a new client over HTTP.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token
    /// * `base_url` - Base URL for API requests (default: <https://api.github.com>)
    /// * `timeout` - Per-request timeout (default: 30 seconds)
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP transport cannot
    /// be created.
    pub fn new(
        token: &str,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        if token.trim().is_empty() {
            return Err(Error::Configuration("GitHub token is empty".to_string()));
        }
        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL);
        let timeout = timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let transport = HttpTransport::new(base_url, token, timeout)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over any transport, e.g. [`crate::testing::MockTransport`].
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            users: UsersClient::new(Arc::clone(&transport)),
            orgs: OrgsClient::new(Arc::clone(&transport)),
            contributions: ContributionsClient::new(Arc::clone(&transport)),
            transport,
        }
    }

    /// Get the underlying transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Get the users client.
    #[must_use]
    pub fn users(&self) -> &UsersClient {
        &self.users
    }

    /// Get the orgs client.
    #[must_use]
    pub fn orgs(&self) -> &OrgsClient {
        &self.orgs
    }

    /// Get the contributions client.
    #[must_use]
    pub fn contributions(&self) -> &ContributionsClient {
        &self.contributions
    }
}
