//! Organizations resource client.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::UsersClient;
use crate::error::{QueryError, QueryErrorKind};
use crate::pager::fetch_all;
use crate::transport::{Request, Transport, PER_PAGE};
use crate::types::{MemberRef, MemberReport, OrganizationRecord};
use crate::validate::Identifier;

/// Client for organization membership queries.
pub struct OrgsClient {
    transport: Arc<dyn Transport>,
    users: UsersClient,
}

impl OrgsClient {
    /// Create a new orgs client.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            users: UsersClient::new(Arc::clone(&transport)),
            transport,
        }
    }

    /// List the public members of an organization with their profiles.
    ///
    /// Members whose profile cannot be resolved, and member-list pages after
    /// the first that fail, end up in [`MemberReport::errors`].
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the organization cannot be
    /// found, or the first page of its member list cannot be fetched.
    pub async fn list_members(&self, org: &str) -> Result<MemberReport, QueryError> {
        let org = Identifier::parse(org)?;
        info!(%org, "listing public members");

        self.ensure_exists(&org).await?;

        let paged = fetch_all(
            self.transport.as_ref(),
            Request::path(format!("/orgs/{org}/public_members")).query("per_page", PER_PAGE),
            &format!("members of organization '{org}'"),
        )
        .await?;

        let mut report = MemberReport::default();
        report.errors.extend(paged.truncated);

        for item in paged.items {
            let member: MemberRef = match serde_json::from_value(item) {
                Ok(member) => member,
                Err(e) => {
                    let err = QueryErrorKind::MalformedRecord(e.to_string())
                        .context(format!("member entry of organization '{org}'"));
                    warn!(error = %err, "skipping member");
                    report.errors.push(err);
                    continue;
                }
            };

            match self.users.resolve(&member.login).await {
                Ok(profile) => report.members.push(profile),
                Err(err) => {
                    warn!(error = %err, "could not resolve member");
                    report.errors.push(err);
                }
            }
        }

        info!(
            %org,
            members = report.members.len(),
            errors = report.errors.len(),
            "member listing finished"
        );
        Ok(report)
    }

    async fn ensure_exists(&self, org: &Identifier) -> Result<(), QueryError> {
        let context = format!("organization '{org}'");
        let response = self
            .transport
            .get(&Request::path(format!("/orgs/{org}")))
            .await
            .map_err(|kind| kind.context(&context))?;
        let _: OrganizationRecord = response.json().map_err(|kind| kind.context(&context))?;
        Ok(())
    }
}
