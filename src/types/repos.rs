//! Repository, branch and commit data models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryErrorKind};

/// Commit activity of one user in one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCommitSummary {
    /// `owner/name`
    pub repository_full_name: String,
    /// Matching commits summed over every branch walked (always at least 1)
    pub commit_count: u32,
    /// Latest author date among those commits
    pub last_commit: DateTime<Utc>,
}

/// Repositories a user committed to plus whatever could not be walked.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContributionReport {
    /// Summaries keyed by full repository name
    pub summaries: BTreeMap<String, RepoCommitSummary>,
    /// Per-repository, per-branch and per-record failures
    pub errors: Vec<QueryError>,
}

/// Running count and latest timestamp for one repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitTally {
    count: u32,
    latest: Option<DateTime<Utc>>,
}

impl CommitTally {
    /// Count one commit authored at `at`. Only a strictly later timestamp
    /// replaces the current latest.
    pub fn record(&mut self, at: DateTime<Utc>) {
        self.count += 1;
        match self.latest {
            Some(latest) if at <= latest => {}
            _ => self.latest = Some(at),
        }
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Summary for `full_name`, or `None` if nothing was counted.
    #[must_use]
    pub fn finish(self, full_name: &str) -> Option<RepoCommitSummary> {
        let last_commit = self.latest?;
        (self.count > 0).then(|| RepoCommitSummary {
            repository_full_name: full_name.to_string(),
            commit_count: self.count,
            last_commit,
        })
    }
}

/// Entry of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoRecord {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub owner: Option<AccountRef>,
}

impl RepoRecord {
    /// Login of the owning account, if present.
    #[must_use]
    pub fn owner_login(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.login.as_deref())
    }
}

/// Entry of `GET /repos/{owner}/{repo}/branches`.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchRecord {
    pub name: String,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    /// GitHub account linked to the author email; `null` when unlinked
    #[serde(default)]
    pub author: Option<AccountRef>,
    pub commit: CommitDetail,
}

impl CommitRecord {
    /// Login of the linked author account, if any.
    #[must_use]
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().and_then(|a| a.login.as_deref())
    }

    /// Author date recorded in the git object.
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` naming the commit when the date is missing
    /// or is not RFC 3339.
    pub fn authored_at(&self) -> Result<DateTime<Utc>, QueryErrorKind> {
        let raw = self
            .commit
            .author
            .as_ref()
            .and_then(|a| a.date.as_deref())
            .ok_or_else(|| {
                QueryErrorKind::MalformedRecord(format!("commit {} has no author date", self.sha))
            })?;

        DateTime::parse_from_rfc3339(raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(|e| {
                QueryErrorKind::MalformedRecord(format!(
                    "commit {} has an unreadable author date '{raw}': {e}",
                    self.sha
                ))
            })
    }
}

/// Account reference embedded in repository and commit records.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRef {
    #[serde(default)]
    pub login: Option<String>,
}

/// The git-level part of a commit record.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<GitSignature>,
}

/// Name, email and date as written in the commit object.
#[derive(Debug, Clone, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Kept as text; parsed only for commits that are counted
    #[serde(default)]
    pub date: Option<String>,
}
