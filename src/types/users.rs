//! User and organization data models.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Public profile of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProfile {
    /// Account login
    pub username: String,
    /// Display name, if the user set one
    pub real_name: Option<String>,
    /// Public email, if the user made one visible
    pub email: Option<String>,
}

impl From<UserRecord> for MemberProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.login,
            real_name: record.name,
            email: record.email,
        }
    }
}

/// Public members of an organization plus whatever could not be resolved.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MemberReport {
    /// Profiles in member-list order
    pub members: Vec<MemberProfile>,
    /// Per-page and per-member failures
    pub errors: Vec<QueryError>,
}

/// `GET /users/{username}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Entry of `GET /orgs/{org}/public_members`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRef {
    pub login: String,
}

/// `GET /orgs/{org}` body. Only used to confirm the organization exists.
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationRecord {
    pub login: String,
}
