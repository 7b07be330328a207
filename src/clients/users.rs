//! Users resource client.

use std::sync::Arc;

use tracing::debug;

use crate::error::QueryError;
use crate::transport::{Request, Transport};
use crate::types::{MemberProfile, UserRecord};
use crate::validate::Identifier;

/// Client for user profile lookups.
#[derive(Clone)]
pub struct UsersClient {
    transport: Arc<dyn Transport>,
}

impl UsersClient {
    /// Create a new users client.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Resolve a user's public profile.
    ///
    /// # Arguments
    ///
    /// * `username` - GitHub login; validated before any request is made
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the request fails, or the
    /// user does not exist.
    pub async fn resolve(&self, username: &str) -> Result<MemberProfile, QueryError> {
        let username = Identifier::parse(username)?;
        self.resolve_identifier(&username).await
    }

    pub(crate) async fn resolve_identifier(
        &self,
        username: &Identifier,
    ) -> Result<MemberProfile, QueryError> {
        let context = format!("user '{username}'");
        let response = self
            .transport
            .get(&Request::path(format!("/users/{username}")))
            .await
            .map_err(|kind| kind.context(&context))?;
        let record: UserRecord = response.json().map_err(|kind| kind.context(&context))?;

        debug!(login = %record.login, "resolved user");
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryErrorKind;
    use crate::testing::{MockResponse, MockTransport};
    use serde_json::json;

    fn client(mock: &MockTransport) -> UsersClient {
        UsersClient::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_resolve_user() {
        let mock = MockTransport::new();
        mock.respond(
            "/users/octocat",
            MockResponse::json(json!({
                "login": "octocat",
                "name": "The Octocat",
                "email": "octocat@github.com"
            })),
        );

        let profile = client(&mock).resolve("octocat").await.expect("user exists");

        assert_eq!(profile.username, "octocat");
        assert_eq!(profile.real_name.as_deref(), Some("The Octocat"));
        assert_eq!(profile.email.as_deref(), Some("octocat@github.com"));
    }

    #[tokio::test]
    async fn test_null_email_is_absent_not_error() {
        let mock = MockTransport::new();
        mock.respond(
            "/users/quiet",
            MockResponse::json(json!({ "login": "quiet", "name": null, "email": null })),
        );

        let profile = client(&mock).resolve("quiet").await.expect("user exists");

        assert_eq!(profile.email, None);
        assert_eq!(profile.real_name, None);
    }

    #[tokio::test]
    async fn test_missing_user_is_hard_failure() {
        let mock = MockTransport::new();

        let err = client(&mock).resolve("nobody").await.unwrap_err();

        assert_eq!(err.context, "user 'nobody'");
        assert_eq!(err.kind.status(), Some(404));
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_request() {
        let mock = MockTransport::new();

        let err = client(&mock).resolve("-bad").await.unwrap_err();

        assert!(matches!(err.kind, QueryErrorKind::InvalidIdentifier(_)));
        assert_eq!(mock.call_count(), 0);
    }
}
